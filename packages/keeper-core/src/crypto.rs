//! Client-side symmetric encryption for sensitive payload fields.
//!
//! The dealer derives a 256-bit AES-GCM key from a user-specific secret
//! and seals each plaintext under a fresh random nonce. Output format is
//! `hex(nonce || ciphertext || tag)`, so every ciphertext carries the
//! nonce it was sealed with.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// AES-GCM standard nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Per-user symmetric cipher. Cheap to construct; hold one per CLI
/// invocation.
pub struct Dealer {
    cipher: Aes256Gcm,
}

impl Dealer {
    /// Derives the key as SHA-256 of the user-specific secret (the
    /// user id concatenated with the login).
    pub fn new(secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        Dealer {
            cipher: Aes256Gcm::new_from_slice(&key)
                .expect("sha-256 output is a valid aes-256 key"),
        }
    }

    /// Seals `plaintext` under a fresh random nonce and returns
    /// `hex(nonce || ciphertext || tag)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| Error::Crypto("encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(hex::encode(out))
    }

    /// Reverses [`Dealer::encrypt`]. Fails on malformed hex, truncated
    /// input, or tag mismatch (wrong key or tampered ciphertext).
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let raw = hex::decode(encoded).map_err(|e| Error::Crypto(format!("bad hex: {e}")))?;
        if raw.len() <= NONCE_LEN {
            return Err(Error::Crypto("ciphertext too short".into()));
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);

        let opened = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| Error::Crypto("tag mismatch".into()))?;

        String::from_utf8(opened).map_err(|_| Error::Crypto("plaintext is not utf-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dealer = Dealer::new("user-id-login");
        for msg in ["", "x", "Denis the best", "пароль", "1111 1111 1111 1111"] {
            let sealed = dealer.encrypt(msg).unwrap();
            assert_ne!(sealed, msg);
            assert_eq!(dealer.decrypt(&sealed).unwrap(), msg);
        }
    }

    #[test]
    fn nonce_is_fresh_per_encryption() {
        let dealer = Dealer::new("user-id-login");
        let a = dealer.encrypt("same message").unwrap();
        let b = dealer.encrypt("same message").unwrap();
        assert_ne!(a, b);
        assert_ne!(a[..NONCE_LEN * 2], b[..NONCE_LEN * 2]);
    }

    #[test]
    fn wrong_key_fails() {
        let dealer = Dealer::new("alice");
        let sealed = dealer.encrypt("secret").unwrap();

        let other = Dealer::new("mallory");
        assert!(matches!(other.decrypt(&sealed), Err(Error::Crypto(_))));
    }

    #[test]
    fn malformed_input_fails() {
        let dealer = Dealer::new("alice");
        assert!(matches!(dealer.decrypt("zz-not-hex"), Err(Error::Crypto(_))));
        assert!(matches!(dealer.decrypt("00ff"), Err(Error::Crypto(_))));

        let mut sealed = dealer.encrypt("secret").unwrap();
        let flipped = if sealed.ends_with('0') { "1" } else { "0" };
        sealed.replace_range(sealed.len() - 1.., flipped);
        assert!(matches!(dealer.decrypt(&sealed), Err(Error::Crypto(_))));
    }
}
