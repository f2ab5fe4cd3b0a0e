use crate::storage::OwnerId;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const KEY_CONTEXT: &str = "premium-estimator 2026-01 bearer token mac";
const MAC_LEN: usize = blake3::OUT_LEN;

/// Payload carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: OwnerId,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to encode token claims: {0}")]
    Encoding(String),
}

/// Issues and verifies `base64url(claims).base64url(mac)` bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    key: [u8; blake3::KEY_LEN],
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(
        &self,
        subject: &OwnerId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: subject.clone(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let encoded = serde_json::to_vec(&claims)
            .map_err(|err| TokenError::Encoding(err.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(encoded);
        let mac = blake3::keyed_hash(&self.key, payload.as_bytes());

        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(mac.as_bytes())))
    }

    /// Check the signature before looking at the claims, then the expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(TokenError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let signature: [u8; MAC_LEN] = signature
            .try_into()
            .map_err(|_| TokenError::Malformed)?;

        // `blake3::Hash` equality is constant time.
        let expected = blake3::keyed_hash(&self.key, payload.as_bytes());
        if expected != blake3::Hash::from(signature) {
            return Err(TokenError::InvalidSignature);
        }

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&decoded).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", 24)
    }

    fn owner() -> OwnerId {
        OwnerId("user-1".to_string())
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let now = Utc::now();
        let token = signer().issue(&owner(), "asha", now).expect("issue");

        let claims = signer().verify(&token, now).expect("verify");
        assert_eq!(claims.sub, owner());
        assert_eq!(claims.username, "asha");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn other_secret_rejects_signature() {
        let now = Utc::now();
        let token = signer().issue(&owner(), "asha", now).expect("issue");
        let other = TokenSigner::new("another-secret", 24);
        assert_eq!(other.verify(&token, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let now = Utc::now();
        let token = signer().issue(&owner(), "asha", now).expect("issue");
        let (_, signature) = token.split_once('.').expect("two parts");

        let forged_claims = TokenClaims {
            sub: OwnerId("admin".to_string()),
            username: "admin".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        };
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).expect("encode"));
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(signer().verify(&forged, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let issued_at = Utc::now() - Duration::hours(25);
        let token = signer().issue(&owner(), "asha", issued_at).expect("issue");
        assert_eq!(signer().verify(&token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let now = Utc::now();
        assert_eq!(signer().verify("not-a-token", now), Err(TokenError::Malformed));
        assert_eq!(signer().verify("abc.%%%", now), Err(TokenError::Malformed));
        assert_eq!(signer().verify("abc.AAAA", now), Err(TokenError::Malformed));
    }
}
