use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    models::UserAccount,
};

/// Caller identity resolved from the bearer token, with the plan and usage
/// read from the identity store at request time.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub account: UserAccount,
}

pub fn extract_bearer_token(parts: &Parts) -> Result<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Auth("Authentication required".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let claims = state.jwt.verify_token(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::Auth("Invalid or expired token".to_string())
        })?;

        let account = state.identity.get(&claims.sub).await?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            account,
        })
    }
}
