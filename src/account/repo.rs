//! Persistence interface and implementations for account records.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::sync::RwLock;
use tracing::Instrument;

use crate::account::models::{NewUserAccount, QuerySpec, SortField, SortOrder, UserAccount};

/// Storage collaborator for account records.
///
/// Implementations must guarantee uniqueness of `account` at the storage
/// layer. The service checks for duplicates before inserting, but that
/// check can race with a concurrent registration; the store is the only
/// place the invariant actually holds.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_account(&self, account: &str) -> Result<Option<UserAccount>>;

    /// Exact match on both the account string and the password digest.
    async fn find_by_credentials(&self, account: &str, digest: &str)
    -> Result<Option<UserAccount>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>>;

    /// Persists a new account and returns its assigned id.
    async fn insert(&self, user: NewUserAccount) -> Result<i64>;

    /// Executes a typed query spec.
    async fn search(&self, spec: &QuerySpec) -> Result<Vec<UserAccount>>;
}

/// Postgres-backed store. The `users` table lives in `migrations/`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_account(&self, account: &str) -> Result<Option<UserAccount>> {
        let query = r"
            SELECT id, account, password_digest, display_name, profile, role,
                   created_at, updated_at
            FROM users
            WHERE account = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, UserAccount>(query)
            .bind(account)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account")
    }

    async fn find_by_credentials(
        &self,
        account: &str,
        digest: &str,
    ) -> Result<Option<UserAccount>> {
        let query = r"
            SELECT id, account, password_digest, display_name, profile, role,
                   created_at, updated_at
            FROM users
            WHERE account = $1
              AND password_digest = $2
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, UserAccount>(query)
            .bind(account)
            .bind(digest)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up credentials")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>> {
        let query = r"
            SELECT id, account, password_digest, display_name, profile, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, UserAccount>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by id")
    }

    async fn insert(&self, user: NewUserAccount) -> Result<i64> {
        let query = r"
            INSERT INTO users (account, password_digest, display_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.account)
            .bind(&user.password_digest)
            .bind(&user.display_name)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(row.get("id")),
            Err(err) if is_unique_violation(&err) => {
                Err(anyhow!("account already taken: {}", user.account))
            }
            Err(err) => Err(err).context("failed to insert account"),
        }
    }

    async fn search(&self, spec: &QuerySpec) -> Result<Vec<UserAccount>> {
        let mut builder = build_search(spec);
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = builder.sql()
        );
        builder
            .build_query_as::<UserAccount>()
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to search accounts")
    }
}

/// Assembles `SELECT ... WHERE ... ORDER BY` from the present spec fields.
/// Column and direction names come from fixed enums, so only bind values
/// ever originate from the caller.
fn build_search(spec: &QuerySpec) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, account, password_digest, display_name, profile, role, \
         created_at, updated_at FROM users",
    );

    let mut clause = " WHERE ";
    if let Some(id) = spec.id {
        builder.push(clause).push("id = ").push_bind(id);
        clause = " AND ";
    }
    if let Some(account) = &spec.account {
        builder.push(clause).push("account = ").push_bind(account.clone());
        clause = " AND ";
    }
    if let Some(display_name) = &spec.display_name {
        builder
            .push(clause)
            .push("display_name = ")
            .push_bind(display_name.clone());
        clause = " AND ";
    }
    if let Some(profile) = &spec.profile {
        builder.push(clause).push("profile = ").push_bind(profile.clone());
        clause = " AND ";
    }
    if let Some(role) = spec.role {
        builder.push(clause).push("role = ").push_bind(role.as_str());
    }

    if let Some(sort) = spec.sort {
        builder
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.order.sql());
    }

    builder
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// In-memory store for tests and single-process demos.
///
/// Mirrors the Postgres behavior, including the account uniqueness
/// guarantee: the check and the append happen under one write lock.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: i64,
    users: Vec<UserAccount>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_account(&self, account: &str) -> Result<Option<UserAccount>> {
        let inner = self.inner.read().map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(inner.users.iter().find(|u| u.account == account).cloned())
    }

    async fn find_by_credentials(
        &self,
        account: &str,
        digest: &str,
    ) -> Result<Option<UserAccount>> {
        let inner = self.inner.read().map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(inner
            .users
            .iter()
            .find(|u| u.account == account && u.password_digest == digest)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>> {
        let inner = self.inner.read().map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUserAccount) -> Result<i64> {
        let mut inner = self.inner.write().map_err(|_| anyhow!("user store lock poisoned"))?;
        if inner.users.iter().any(|u| u.account == user.account) {
            return Err(anyhow!("account already taken: {}", user.account));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        inner.users.push(UserAccount {
            id,
            account: user.account,
            password_digest: user.password_digest,
            display_name: user.display_name,
            profile: None,
            role: user.role,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn search(&self, spec: &QuerySpec) -> Result<Vec<UserAccount>> {
        let inner = self.inner.read().map_err(|_| anyhow!("user store lock poisoned"))?;
        let mut matches: Vec<UserAccount> = inner
            .users
            .iter()
            .filter(|user| spec_matches(spec, user))
            .cloned()
            .collect();

        if let Some(sort) = spec.sort {
            matches.sort_by(|a, b| {
                let ordering = match sort.field {
                    SortField::Id => a.id.cmp(&b.id),
                    SortField::Account => a.account.cmp(&b.account),
                    SortField::DisplayName => a.display_name.cmp(&b.display_name),
                    SortField::Role => a.role.as_str().cmp(b.role.as_str()),
                    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                    SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                };
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        Ok(matches)
    }
}

fn spec_matches(spec: &QuerySpec, user: &UserAccount) -> bool {
    spec.id.map_or(true, |id| user.id == id)
        && spec.account.as_deref().map_or(true, |v| user.account == v)
        && spec
            .display_name
            .as_deref()
            .map_or(true, |v| user.display_name == v)
        && spec
            .profile
            .as_deref()
            .map_or(true, |v| user.profile.as_deref() == Some(v))
        && spec.role.map_or(true, |role| user.role == role)
}
