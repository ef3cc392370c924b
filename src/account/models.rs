use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Access level persisted on every account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Banned,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Banned => "banned",
        }
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "banned" => Ok(Self::Banned),
            _ => Err(Error::InvalidRole),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full persistent account record.
///
/// Carries the password digest, so it stays inside the process; anything
/// that leaves goes through [`UserView`].
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: i64,
    pub account: String,
    pub password_digest: String,
    pub display_name: String,
    pub profile: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for UserAccount {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            account: row.try_get("account")?,
            password_digest: row.try_get("password_digest")?,
            display_name: row.try_get("display_name")?,
            profile: row.try_get("profile")?,
            role: role.parse().map_err(|_| {
                sqlx::Error::Decode(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid users.role value: {role}"),
                )))
            })?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Insert payload; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub account: String,
    pub password_digest: String,
    pub display_name: String,
    pub role: UserRole,
}

/// Desensitized projection of a [`UserAccount`].
///
/// No digest field exists on this type, and the mapping below enumerates
/// every exposed field by hand, so nothing sensitive can ride along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub account: String,
    pub display_name: String,
    pub profile: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserView {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id,
            account: user.account.clone(),
            display_name: user.display_name.clone(),
            profile: user.profile.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Caller-facing filter request. Every field is optional; absent fields
/// place no predicate.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserQueryRequest {
    pub id: Option<i64>,
    pub account: Option<String>,
    pub display_name: Option<String>,
    pub profile: Option<String>,
    pub role: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

/// Typed query produced by [`build_query`](crate::account::service::AccountService::build_query).
///
/// Each present field is an exact-equality predicate; an absent field is
/// omitted entirely, never treated as "match null".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuerySpec {
    pub id: Option<i64>,
    pub account: Option<String>,
    pub display_name: Option<String>,
    pub profile: Option<String>,
    pub role: Option<UserRole>,
    pub sort: Option<SortSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Columns results may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Account,
    DisplayName,
    Role,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Account => "account",
            Self::DisplayName => "display_name",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "id" => Ok(Self::Id),
            "account" => Ok(Self::Account),
            "display_name" => Ok(Self::DisplayName),
            "role" => Ok(Self::Role),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            _ => Err(Error::UnknownSortField),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Ascending only for the literal request value `"ascend"`.
    pub(crate) fn from_request(value: Option<&str>) -> Self {
        if value == Some("ascend") {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub(crate) const fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserAccount {
        UserAccount {
            id: 1,
            account: "alice1".to_string(),
            password_digest: "9f6583fbe9cdf5882043d01d35aace5c".to_string(),
            display_name: "no name".to_string(),
            profile: Some("hello".to_string()),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [UserRole::User, UserRole::Admin, UserRole::Banned] {
            assert_eq!(role.as_str().parse::<UserRole>().ok(), Some(role));
        }
    }

    #[test]
    fn role_rejects_unknown_text() {
        assert!("root".parse::<UserRole>().is_err());
        assert!("ADMIN".parse::<UserRole>().is_err());
        assert!("".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn view_copies_public_fields_only() {
        let user = sample_user();
        let view = UserView::from(&user);
        assert_eq!(view.id, user.id);
        assert_eq!(view.account, user.account);
        assert_eq!(view.display_name, user.display_name);
        assert_eq!(view.profile, user.profile);
        assert_eq!(view.role, user.role);
        assert_eq!(view.created_at, user.created_at);

        let json = serde_json::to_value(&view).expect("view serializes");
        assert!(json.get("password_digest").is_none());
        assert_eq!(json["account"], "alice1");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn sort_order_is_ascending_only_for_ascend() {
        assert_eq!(SortOrder::from_request(Some("ascend")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_request(Some("descend")), SortOrder::Descending);
        assert_eq!(SortOrder::from_request(Some("ASCEND")), SortOrder::Descending);
        assert_eq!(SortOrder::from_request(None), SortOrder::Descending);
    }

    #[test]
    fn sort_field_parses_known_columns() {
        assert_eq!("created_at".parse::<SortField>().ok(), Some(SortField::CreatedAt));
        assert_eq!(
            "display_name".parse::<SortField>().ok(),
            Some(SortField::DisplayName)
        );
        assert!("password_digest".parse::<SortField>().is_err());
        assert!("; DROP TABLE users".parse::<SortField>().is_err());
    }
}
