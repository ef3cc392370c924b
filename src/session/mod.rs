//! Session attribute storage for authenticated principals.
//!
//! The crate never owns session lifecycle. Creation, expiry, and transport
//! (cookies, headers, whatever the embedder uses) happen outside; this
//! module only defines how account state is read from and written into one
//! logical client session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known attribute key under which the logged-in principal is stored.
pub const USER_SESSION_KEY: &str = "user_login_state";

/// Login-time snapshot of the authenticated user.
///
/// This only identifies which record to fetch. Authorization decisions
/// always re-read the full record from the store, so a stale snapshot can
/// never extend revoked access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrincipal {
    pub user_id: i64,
    pub account: String,
}

/// Attribute storage scoped to one logical client session.
pub trait SessionContext: Send {
    fn get(&self, key: &str) -> Option<&SessionPrincipal>;
    fn set(&mut self, key: &str, principal: SessionPrincipal);
    /// Removes and returns the attribute, if present.
    fn remove(&mut self, key: &str) -> Option<SessionPrincipal>;
}

/// `HashMap`-backed session for tests and single-process embedders.
#[derive(Debug, Default)]
pub struct MemorySession {
    attributes: HashMap<String, SessionPrincipal>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionContext for MemorySession {
    fn get(&self, key: &str) -> Option<&SessionPrincipal> {
        self.attributes.get(key)
    }

    fn set(&mut self, key: &str, principal: SessionPrincipal) {
        self.attributes.insert(key.to_string(), principal);
    }

    fn remove(&mut self, key: &str) -> Option<SessionPrincipal> {
        self.attributes.remove(key)
    }
}
