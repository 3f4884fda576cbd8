//! Error taxonomy shared by the server and client packages.
//!
//! Every failure mode is a value on the return path; binaries wrap these
//! with `eyre` at the edge for reporting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Lookup missed. Inside the server sync engine this is not a
    /// failure: an unknown id means "new item, insert".
    #[error("item not found")]
    NotFound,

    /// Unique-login violation on user registration.
    #[error("login is already taken")]
    AlreadyExists,

    /// Missing, malformed, expired, or badly signed token.
    #[error("authentication required")]
    Unauthenticated,

    /// Login supplied the wrong password.
    #[error("passwords mismatch")]
    PasswordMismatch,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("crypto failure: {0}")]
    Crypto(String),

    /// Network failure between client and server.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Backing-store I/O or transaction failure.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Caller scope cancelled or a per-request deadline expired.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for wrapping storage-layer failures with context.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("record encoding: {err}"))
    }
}
