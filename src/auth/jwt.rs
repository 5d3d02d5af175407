use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Claims the identity provider puts in a journal bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id; journal rows are keyed by it.
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(data.claims)
}

/// Token issuance belongs to the identity provider; tests mint their own.
#[cfg(test)]
pub(crate) fn create_access_token(user_id: &str, ttl_secs: i64, config: &Config) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap()
}
