use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Fixed token lifetime: 24 hours.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues a signed HS256 bearer token carrying the user id as subject.
pub fn issue_token(user_id: i64, secret: &str) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
}

/// Verifies signature and expiry, returning the subject user id.
/// Every failure mode collapses to `Unauthenticated`.
pub fn decode_token(token: &str, secret: &str) -> Result<i64, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;
    Ok(data.claims.sub)
}
