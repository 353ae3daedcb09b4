use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token cookie missing")]
    MissingToken,

    #[error("Invalid token: {source}")]
    InvalidToken {
        #[from]
        source: jsonwebtoken::errors::Error,
    },

    #[error("Token signing failed: {message}")]
    Signing { message: String },
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Decoded session token payload.
///
/// Whatever the caller posted to `/jwt` is kept in `extra`; `email` is pulled
/// out because the order listing authorizes against it. It is signed as sent,
/// so it need not be a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims from a caller-supplied payload. Any `iat`/`exp` keys in the
    /// payload are replaced.
    pub fn from_payload(
        mut payload: Map<String, Value>,
        issued_at: i64,
        expires_at: i64,
    ) -> Self {
        payload.remove("iat");
        payload.remove("exp");

        let email = payload.remove("email").filter(|email| !email.is_null());

        Self {
            email,
            iat: issued_at,
            exp: expires_at,
            extra: payload,
        }
    }

    pub fn email_str(&self) -> Option<&str> {
        self.email.as_ref().and_then(Value::as_str)
    }

    /// Strict equality with the requested email: both absent matches, a
    /// non-string email never does.
    pub fn matches_email(&self, requested: Option<&str>) -> bool {
        match (&self.email, requested) {
            (None, None) => true,
            (Some(Value::String(email)), Some(requested)) => email == requested,
            _ => false,
        }
    }
}

/// Signs and verifies HS256 session tokens with a server-held secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload` with an expiry of now + ttl
    pub fn issue(&self, payload: Map<String, Value>) -> AuthResult<String> {
        self.issue_at(payload, Utc::now())
    }

    pub fn issue_at(
        &self,
        payload: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        let iat = issued_at.timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::from_payload(payload, iat, iat.saturating_add(ttl_secs));

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AuthError::Signing {
                message: e.to_string(),
            }
        })
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
