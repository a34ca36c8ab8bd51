use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthUser, Identity};
use crate::config::MAX_JWT_EXPIRATION_HOURS;
use crate::error::AppError;
use infra::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub role: Role,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let hours = expiration_hours.min(MAX_JWT_EXPIRATION_HOURS) as i64;
        let exp = now + Duration::hours(hours);

        Self {
            sub: user_id.to_string(),
            email,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Issues and verifies HS256 identity tokens. Holds no per-user state.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: u64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    pub fn create_token(&self, user_id: Uuid, email: String, role: Role) -> Result<String, AppError> {
        let claims = Claims::new(user_id, email, role, self.expiration_hours);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))
    }

    /// Resolve an `Authorization` header value (`Bearer <jwt>`) into an identity.
    /// Anything missing or unverifiable is anonymous.
    pub fn identify(&self, authorization: Option<&str>) -> Identity {
        let Some(token) = authorization.and_then(|h| h.trim().strip_prefix("Bearer ")) else {
            return Identity::Anonymous;
        };

        match self.verify_token(token.trim()).and_then(AuthUser::try_from) {
            Ok(user) => Identity::User(user),
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                Identity::Anonymous
            }
        }
    }
}
