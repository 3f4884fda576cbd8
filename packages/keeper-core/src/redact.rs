//! Redaction wrapper for vault secrets in logs and serialized output.

use std::fmt::{self, Debug, Display};

/// Wrapper that hides its inner value behind `<redacted>` in `Debug`,
/// `Display`, and `Serialize`. Holds the database URI and token secret
/// in the server config and guards the password fields of user records
/// when they cross a formatting boundary.
///
/// ```ignore
/// tracing::info!(database_uri = %Redacted(&uri), "connecting");
/// // Logs: database_uri = <redacted>
/// ```
#[derive(Clone, Copy)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// The wrapped value, for the call sites that need the secret
    /// itself (the database connect call, the token signer).
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_leaks_the_inner_value() {
        let secret = Redacted("hunter2");
        assert_eq!(format!("{secret}"), "<redacted>");
        assert_eq!(format!("{secret:?}"), "<redacted>");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"<redacted>\"");
    }

    #[test]
    fn expose_returns_the_secret() {
        let secret = Redacted(String::from("postgres://user:pw@db/keeper"));
        assert_eq!(secret.expose(), "postgres://user:pw@db/keeper");
    }
}
