// Bearer-token authentication: Argon2id password hashing, HS256 tokens with
// a fixed 24h expiry, and the AuthUser extractor protected routes take as an
// argument. There is no role-based access control; the only authorization
// primitive is the identity check in `authorize_self`.

pub mod password;
pub mod token;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::errors::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthenticated)?;

        let user_id = token::decode_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser { id: user_id })
    }
}

/// Update/delete-self gate: callers may only act on their own record.
pub fn authorize_self(current_id: i64, target_id: i64) -> Result<(), AppError> {
    if current_id == target_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
