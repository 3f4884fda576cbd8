//! Compact HMAC-SHA256 bearer tokens.
//!
//! Token format: `base64url(payload).base64url(signature)` where the
//! payload is `{"sub": <user_id>, "exp": <unix seconds>}` and the
//! signature is HMAC-SHA256 over the encoded payload. No header section;
//! the algorithm is fixed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Tokens are valid for 24 hours from issuance.
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

/// Issues a token binding `sub = user_id` with a 24-hour expiry.
pub fn issue(user_id: Uuid, secret: &[u8]) -> Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let signature = URL_SAFE_NO_PAD.encode(sign(payload.as_bytes(), secret));
    Ok(format!("{payload}.{signature}"))
}

/// Validates signature and expiry and returns the bound user id. Any
/// defect — missing separator, bad base64, bad JSON, bad signature,
/// expiry in the past — yields [`Error::Unauthenticated`].
pub fn verify(token: &str, secret: &[u8]) -> Result<Uuid> {
    let (payload, signature) = token.split_once('.').ok_or(Error::Unauthenticated)?;

    let presented = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| Error::Unauthenticated)?;
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| Error::Unauthenticated)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&presented)
        .map_err(|_| Error::Unauthenticated)?;

    let claims: Claims = serde_json::from_slice(
        &URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| Error::Unauthenticated)?,
    )
    .map_err(|_| Error::Unauthenticated)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(Error::Unauthenticated);
    }
    Ok(claims.sub)
}

fn sign(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .expect("hmac accepts keys of any length");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn issued_token_verifies() {
        let user = Uuid::new_v4();
        let token = issue(user, SECRET).unwrap();
        assert_eq!(verify(&token, SECRET).unwrap(), user);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(Uuid::new_v4(), SECRET).unwrap();
        assert!(matches!(
            verify(&token, b"other-secret"),
            Err(Error::Unauthenticated)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let user = Uuid::new_v4();
        let token = issue(user, SECRET).unwrap();

        let forged_claims = Claims {
            sub: Uuid::new_v4(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let original_sig = token.split_once('.').unwrap().1;
        let forged = format!("{forged_payload}.{original_sig}");

        assert!(matches!(verify(&forged, SECRET), Err(Error::Unauthenticated)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let signature = URL_SAFE_NO_PAD.encode(sign(payload.as_bytes(), SECRET));
        let token = format!("{payload}.{signature}");

        assert!(matches!(verify(&token, SECRET), Err(Error::Unauthenticated)));
    }

    #[test]
    fn garbage_is_rejected() {
        for junk in ["", "no-separator", "a.b.c", "!!.!!"] {
            assert!(matches!(verify(junk, SECRET), Err(Error::Unauthenticated)));
        }
    }
}
