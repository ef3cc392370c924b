//! # Ingresso (User Accounts & Session Authentication)
//!
//! `ingresso` is the account core of a web application: registration,
//! login and logout, session-backed authentication, desensitized user
//! views, and typed query-filter construction. It owns no HTTP surface;
//! embedders wire the [`AccountService`] into their own handlers and hand
//! it a [`UserStore`] plus a per-request [`SessionContext`].
//!
//! ## Accounts
//!
//! Accounts are identified by a unique `account` string (4 characters
//! minimum) and carry a display name, an optional profile blurb, and a
//! role (`user`, `admin`, `banned`). Passwords (8 characters minimum)
//! exist in storage only as digests.
//!
//! ## Authentication & Sessions
//!
//! Login resolves the account string and the password digest in one exact
//! lookup. A miss always reads "account not found or wrong password", so
//! responses never reveal whether the account exists. On success a
//! [`SessionPrincipal`] lands in the session under [`USER_SESSION_KEY`];
//! authorization never trusts that snapshot, and the current user is
//! re-fetched by id on every call so bans and role changes take effect on
//! the next request. Logging out without an authenticated session is an
//! error, not a no-op.
//!
//! ## Queries
//!
//! Filter requests are translated into a typed [`QuerySpec`]: present
//! fields become exact-equality predicates, absent fields are omitted,
//! and sortable columns are a fixed enum, so caller text can never reach
//! the SQL as anything but a bind value.
//!
//! > **Warning:** the password digest is the historical static-salt MD5
//! > scheme, preserved for compatibility with existing credential rows.
//! > Do not start a new deployment on it; see [`account::password`].

pub mod account;
pub mod error;
pub mod session;

pub use account::models::{
    NewUserAccount, QuerySpec, SortField, SortOrder, SortSpec, UserAccount, UserQueryRequest,
    UserRole, UserView,
};
pub use account::repo::{MemoryUserStore, PgUserStore, UserStore};
pub use account::service::AccountService;
pub use error::{Error, ErrorKind};
pub use session::{MemorySession, SessionContext, SessionPrincipal, USER_SESSION_KEY};
