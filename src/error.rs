//! Typed failures for account operations.
//!
//! Every fallible operation in this crate returns one of these variants.
//! Messages are fixed strings so callers can surface them directly;
//! [`Error::kind`] gives the machine-readable class.

use thiserror::Error;

/// Failure class carried by every [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input, or a business-rule violation.
    Validation,
    /// No authenticated session state.
    Auth,
    /// The persistence collaborator failed.
    Storage,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing fields")]
    MissingFields,
    #[error("account too short")]
    AccountTooShort,
    #[error("password too short")]
    PasswordTooShort,
    #[error("password mismatch")]
    PasswordMismatch,
    #[error("account already exists")]
    AccountExists,
    /// Unknown account and wrong password share this variant on purpose;
    /// the caller must not be able to tell which one happened.
    #[error("account not found or wrong password")]
    BadCredentials,
    #[error("empty list")]
    EmptyList,
    #[error("missing query")]
    MissingQuery,
    #[error("invalid role")]
    InvalidRole,
    #[error("unknown sort field")]
    UnknownSortField,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("registration failed")]
    Registration(#[source] anyhow::Error),
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields
            | Self::AccountTooShort
            | Self::PasswordTooShort
            | Self::PasswordMismatch
            | Self::AccountExists
            | Self::BadCredentials
            | Self::EmptyList
            | Self::MissingQuery
            | Self::InvalidRole
            | Self::UnknownSortField => ErrorKind::Validation,
            Self::NotLoggedIn => ErrorKind::Auth,
            Self::Registration(_) | Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(Error::MissingFields.kind(), ErrorKind::Validation);
        assert_eq!(Error::AccountExists.kind(), ErrorKind::Validation);
        assert_eq!(Error::BadCredentials.kind(), ErrorKind::Validation);
        assert_eq!(Error::NotLoggedIn.kind(), ErrorKind::Auth);
        assert_eq!(
            Error::Storage(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            Error::Registration(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(Error::MissingFields.to_string(), "missing fields");
        assert_eq!(Error::AccountTooShort.to_string(), "account too short");
        assert_eq!(Error::PasswordTooShort.to_string(), "password too short");
        assert_eq!(Error::PasswordMismatch.to_string(), "password mismatch");
        assert_eq!(Error::AccountExists.to_string(), "account already exists");
        assert_eq!(
            Error::BadCredentials.to_string(),
            "account not found or wrong password"
        );
        assert_eq!(Error::NotLoggedIn.to_string(), "not logged in");
        assert_eq!(
            Error::Registration(anyhow::anyhow!("db down")).to_string(),
            "registration failed"
        );
    }

    #[test]
    fn storage_variants_keep_their_source() {
        use std::error::Error as _;
        let err = Error::Storage(anyhow::anyhow!("connection refused"));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection refused"));
    }
}
