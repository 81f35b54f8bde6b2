//! Bearer-token identity gate.
//!
//! Issues HS256 JWTs carrying an email claim and verifies them on
//! inbound requests, yielding the trusted identity the coordinator
//! compares against the claimed owner. The gate is deliberately
//! narrow: sign a token, verify a token. Everything downstream treats
//! the verified email as opaque.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors produced by the identity gate.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token accompanied the request.
    #[error("no token provided")]
    Missing,
    /// The token failed signature or expiry validation.
    #[error("invalid or expired token")]
    Invalid,
    /// Token signing failed.
    #[error("token signing failed")]
    Signing,
}

/// JWT claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated email.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}

/// HS256 token issuer and verifier.
pub struct AuthGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl AuthGate {
    /// Creates a gate over a shared secret with the given token TTL.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Issues a signed token for an email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let now = Self::now_secs();
        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AuthError::Signing)
    }

    /// Verifies a token and returns the email it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Invalid`] for a tampered, malformed, or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|_| AuthError::Invalid)
    }
}
