//! Shared building blocks for the keeper vault: the item model, the
//! client-side crypto dealer, bearer tokens, password hashing, and the
//! error taxonomy used across the server and client packages.

pub mod crypto;
pub mod error;
pub mod model;
pub mod password;
pub mod redact;
pub mod sync;
pub mod token;

pub use error::Error;
pub use model::{Binary, Card, Client, Credentials, Kind, Status, Text, User, VaultItem};
pub use sync::SyncBatch;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;
