//! Core account operations: registration, login, session state, and views.

use tracing::{debug, error, instrument};

use crate::account::models::{
    NewUserAccount, QuerySpec, SortField, SortOrder, SortSpec, UserAccount, UserQueryRequest,
    UserRole, UserView,
};
use crate::account::password::encrypt_password;
use crate::account::repo::UserStore;
use crate::error::Error;
use crate::session::{SessionContext, SessionPrincipal, USER_SESSION_KEY};

pub const MIN_ACCOUNT_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const DEFAULT_DISPLAY_NAME: &str = "no name";

/// Account orchestration over a [`UserStore`] and a per-request
/// [`SessionContext`].
///
/// Every operation validates its input before touching either
/// collaborator, so a failed precondition never leaves partial state
/// behind.
#[derive(Clone)]
pub struct AccountService<S> {
    store: S,
}

impl<S: UserStore> AccountService<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new account and returns its assigned id.
    ///
    /// The duplicate check here is advisory; the store's uniqueness
    /// constraint has the final word when two registrations race.
    ///
    /// # Errors
    /// `Validation` on blank input, a short account or password, a
    /// mismatched confirmation, or an already-registered account.
    /// `Storage` when persistence fails.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(
        &self,
        account: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<i64, Error> {
        if is_blank(account) || is_blank(password) || is_blank(confirm_password) {
            return Err(Error::MissingFields);
        }
        if account.chars().count() < MIN_ACCOUNT_LEN {
            return Err(Error::AccountTooShort);
        }
        if password.chars().count() < MIN_PASSWORD_LEN
            || confirm_password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err(Error::PasswordTooShort);
        }
        if password != confirm_password {
            return Err(Error::PasswordMismatch);
        }

        if self
            .store
            .find_by_account(account)
            .await
            .map_err(Error::Storage)?
            .is_some()
        {
            return Err(Error::AccountExists);
        }

        let user = NewUserAccount {
            account: account.to_string(),
            password_digest: encrypt_password(password),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            role: UserRole::default(),
        };
        let id = self.store.insert(user).await.map_err(|err| {
            error!("failed to persist new account: {err:#}");
            Error::Registration(err)
        })?;

        debug!(id, "account registered");
        Ok(id)
    }

    /// Authenticates the credentials, records the principal in the
    /// session, and returns the desensitized view.
    ///
    /// # Errors
    /// `Validation` on blank or short input, and on a credential miss.
    /// Unknown account and wrong password produce the identical error so
    /// the response never reveals which one failed. `Storage` when the
    /// lookup itself fails.
    #[instrument(skip(self, password, session))]
    pub async fn login(
        &self,
        account: &str,
        password: &str,
        session: &mut dyn SessionContext,
    ) -> Result<UserView, Error> {
        if is_blank(account) || is_blank(password) {
            return Err(Error::MissingFields);
        }
        if account.chars().count() < MIN_ACCOUNT_LEN {
            return Err(Error::AccountTooShort);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::PasswordTooShort);
        }

        let digest = encrypt_password(password);
        let user = self
            .store
            .find_by_credentials(account, &digest)
            .await
            .map_err(Error::Storage)?
            .ok_or(Error::BadCredentials)?;

        session.set(
            USER_SESSION_KEY,
            SessionPrincipal {
                user_id: user.id,
                account: user.account.clone(),
            },
        );
        debug!(user_id = user.id, "session established");
        Ok(UserView::from(&user))
    }

    /// Returns the fresh record for the logged-in user.
    ///
    /// The session principal only says which record to fetch; the record
    /// itself is always re-read so role changes and removals take effect
    /// on the very next call.
    ///
    /// # Errors
    /// `Auth` when no principal is in the session or the referenced
    /// account no longer exists. `Storage` when the re-fetch fails.
    pub async fn current_user(&self, session: &dyn SessionContext) -> Result<UserAccount, Error> {
        let principal = session.get(USER_SESSION_KEY).ok_or(Error::NotLoggedIn)?;
        self.store
            .find_by_id(principal.user_id)
            .await
            .map_err(Error::Storage)?
            .ok_or(Error::NotLoggedIn)
    }

    /// Clears the session principal.
    ///
    /// # Errors
    /// `Auth` when no principal is present: logging out without being
    /// logged in is rejected, not treated as a silent no-op.
    pub fn logout(&self, session: &mut dyn SessionContext) -> Result<bool, Error> {
        session.remove(USER_SESSION_KEY).ok_or(Error::NotLoggedIn)?;
        Ok(true)
    }

    /// Projects a record into its desensitized view.
    #[must_use]
    pub fn to_view(&self, user: &UserAccount) -> UserView {
        UserView::from(user)
    }

    /// Projects a list of records, preserving order.
    ///
    /// # Errors
    /// `Validation` ("empty list") on an empty input; callers must handle
    /// the no-results case explicitly rather than receive a silently
    /// empty list.
    pub fn to_view_list(&self, users: &[UserAccount]) -> Result<Vec<UserView>, Error> {
        if users.is_empty() {
            return Err(Error::EmptyList);
        }
        Ok(users.iter().map(UserView::from).collect())
    }

    /// Translates a filter request into a typed [`QuerySpec`].
    ///
    /// Present fields become exact-equality predicates; absent fields are
    /// omitted. Ordering is ascending only for the literal sort order
    /// `"ascend"`.
    ///
    /// # Errors
    /// `Validation` when the request is absent, names an unknown role, or
    /// names an unknown sort field.
    pub fn build_query(&self, request: Option<&UserQueryRequest>) -> Result<QuerySpec, Error> {
        let request = request.ok_or(Error::MissingQuery)?;

        let role = match request.role.as_deref() {
            Some(value) => Some(value.parse::<UserRole>()?),
            None => None,
        };
        let sort = match request.sort_field.as_deref() {
            Some(field) => Some(SortSpec {
                field: field.parse::<SortField>()?,
                order: SortOrder::from_request(request.sort_order.as_deref()),
            }),
            None => None,
        };

        Ok(QuerySpec {
            id: request.id,
            account: request.account.clone(),
            display_name: request.display_name.clone(),
            profile: request.profile.clone(),
            role,
            sort,
        })
    }

    /// Runs a filter request end to end: build the spec, query the store,
    /// desensitize the results.
    ///
    /// # Errors
    /// Everything [`build_query`](Self::build_query) rejects, `Storage`
    /// when the store fails, and `Validation` ("empty list") when nothing
    /// matched.
    pub async fn search(
        &self,
        request: Option<&UserQueryRequest>,
    ) -> Result<Vec<UserView>, Error> {
        let spec = self.build_query(request)?;
        let users = self.store.search(&spec).await.map_err(Error::Storage)?;
        self.to_view_list(&users)
    }

    /// Digests a plaintext password with the crate's legacy scheme. See
    /// [`encrypt_password`](crate::account::password::encrypt_password)
    /// for the compatibility caveats.
    #[must_use]
    pub fn encrypt_password(&self, password: &str) -> String {
        encrypt_password(password)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
