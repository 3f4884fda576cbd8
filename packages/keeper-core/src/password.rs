//! bcrypt password hashing for user records.

use crate::{Error, Result};

/// Cost factor for new hashes. The minimum bcrypt accepts; hashes are
/// re-verified on every client invocation.
const COST: u32 = 4;

pub fn hash(password: &str) -> Result<String> {
    bcrypt::hash(password, COST).map_err(|e| Error::Crypto(format!("bcrypt: {e}")))
}

/// Verifies `password` against a stored hash. A valid hash with the
/// wrong password is [`Error::PasswordMismatch`]; an unparseable hash is
/// a crypto failure.
pub fn verify(password: &str, hashed: &str) -> Result<()> {
    match bcrypt::verify(password, hashed) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::PasswordMismatch),
        Err(e) => Err(Error::Crypto(format!("bcrypt: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash("s3cret").unwrap();
        assert_ne!(hashed, "s3cret");
        verify("s3cret", &hashed).unwrap();
    }

    #[test]
    fn wrong_password_is_mismatch() {
        let hashed = hash("s3cret").unwrap();
        assert!(matches!(
            verify("not-it", &hashed),
            Err(Error::PasswordMismatch)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("same").unwrap(), hash("same").unwrap());
    }
}
