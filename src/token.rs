//! Issuing and verifying signed access tokens.
//!
//! Tokens are HMAC-SHA256 JWTs carrying the subject, an absolute expiry,
//! and a fixed token-kind marker. Validity is purely time-bounded: there is
//! no revocation list, so a leaked token stays usable until it expires.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use crate::error::Error;

/// Kind marker embedded in every access token.
const ACCESS_TOKEN_KIND: &str = "access";

/// Claims extracted from a successfully verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Identity the token was issued for.
    pub subject: String,
    /// Token-kind marker, always `access` after verification.
    pub kind: String,
}

/// Issues and verifies access tokens with a symmetric process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
}

impl TokenService {
    /// Create a token service over the given signing secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn key(&self) -> Result<Hmac<Sha256>, Error> {
        Hmac::new_from_slice(&self.secret).map_err(|_| Error::ProcessingFailed)
    }

    fn sign(&self, subject: &str, kind: &str, validity: Duration) -> Result<String, Error> {
        let now = Utc::now();
        let mut claims = Claims {
            registered: RegisteredClaims {
                issuer: None,
                subject: Some(subject.to_string()),
                audience: None,
                expiration: Some((now + validity).timestamp() as u64),
                not_before: None,
                issued_at: Some(now.timestamp() as u64),
                json_web_token_id: None,
            },
            private: Default::default(),
        };
        claims
            .private
            .insert("kind".to_string(), serde_json::Value::String(kind.to_string()));

        claims
            .sign_with_key(&self.key()?)
            .map_err(|_| Error::ProcessingFailed)
    }

    /// Issue a signed token for `subject`, expiring `validity` from now.
    pub fn issue(&self, subject: &str, validity: Duration) -> Result<String, Error> {
        self.sign(subject, ACCESS_TOKEN_KIND, validity)
    }

    /// Verify a token and return its claims.
    ///
    /// Fails with [`Error::InvalidToken`] when the signature, structure, or
    /// signing algorithm is wrong, [`Error::ExpiredToken`] when past the
    /// embedded expiry, and [`Error::Unauthorized`] when the subject is
    /// empty or the kind marker is not `access`.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, Error> {
        let token: Token<Header, Claims, _> = token
            .verify_with_key(&self.key()?)
            .map_err(|_| Error::InvalidToken)?;
        let claims = token.claims();

        // A token without an expiry was not issued here.
        let expiration = claims.registered.expiration.ok_or(Error::InvalidToken)?;
        if (expiration as i64) < Utc::now().timestamp() {
            return Err(Error::ExpiredToken);
        }

        let subject = claims
            .registered
            .subject
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(Error::Unauthorized)?;

        let kind = claims
            .private
            .get("kind")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if kind != ACCESS_TOKEN_KIND {
            return Err(Error::Unauthorized);
        }

        Ok(AccessClaims { subject, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"unit-test-secret".to_vec())
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let tokens = service();
        let signed = tokens.issue("user-1", Duration::minutes(15)).unwrap();

        let claims = tokens.verify(&signed).unwrap();
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.kind, "access");
    }

    #[test]
    fn test_expired_token_is_classified() {
        let tokens = service();
        let signed = tokens.issue("user-1", Duration::minutes(-5)).unwrap();

        assert_eq!(tokens.verify(&signed), Err(Error::ExpiredToken));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(service().verify("not-a-token"), Err(Error::InvalidToken));
        assert_eq!(service().verify(""), Err(Error::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let signed = service().issue("user-1", Duration::minutes(15)).unwrap();
        let other = TokenService::new(b"another-secret".to_vec());

        assert_eq!(other.verify(&signed), Err(Error::InvalidToken));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let tokens = service();
        let mut signed = tokens.issue("user-1", Duration::minutes(15)).unwrap();
        signed.push('A');

        assert_eq!(tokens.verify(&signed), Err(Error::InvalidToken));
    }

    #[test]
    fn test_empty_subject_is_unauthorized() {
        let tokens = service();
        let signed = tokens
            .sign("", ACCESS_TOKEN_KIND, Duration::minutes(15))
            .unwrap();

        assert_eq!(tokens.verify(&signed), Err(Error::Unauthorized));
    }

    #[test]
    fn test_wrong_kind_is_unauthorized() {
        let tokens = service();
        let signed = tokens.sign("user-1", "refresh", Duration::minutes(15)).unwrap();

        assert_eq!(tokens.verify(&signed), Err(Error::Unauthorized));
    }
}
