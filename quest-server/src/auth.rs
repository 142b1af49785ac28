use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims we consume from a bearer token. The engines only ever see the
/// numeric user id carried in `sub`; token issuance lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token does not carry a user id")]
    InvalidSubject,
}

pub struct AuthService {
    decoding_key: DecodingKey,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            dev_mode: false,
        }
    }

    /// Accepts `dev:<user_id>` tokens instead of validating signatures.
    pub fn new_dev_mode() -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(b"dev"),
            dev_mode: true,
        }
    }

    /// Validate a bearer token and extract the authenticated user id.
    pub fn validate_token(&self, token: &str) -> Result<i32, AuthError> {
        if self.dev_mode {
            if let Some(raw_id) = token.strip_prefix("dev:") {
                return raw_id.parse().map_err(|_| AuthError::InvalidSubject);
            }
            return Err(AuthError::InvalidToken);
        }

        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::warn!("Rejected JWT: {:?}", e);
                AuthError::InvalidToken
            })?;

        token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidSubject)
    }
}
