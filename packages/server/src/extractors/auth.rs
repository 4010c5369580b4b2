use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::{access, jwt};

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

/// Pull the bearer token out of the request, if any.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
        })
    }
}

/// Caller holding the active judge capability.
///
/// Rejects with 403 when the user has no active judge record.
pub struct JudgeUser {
    pub user_id: i32,
    pub username: String,
    pub judge_id: i32,
}

impl FromRequestParts<AppState> for JudgeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let judge_id = access::judge_id_for_user(state, auth.user_id)
            .await?
            .ok_or(AppError::PermissionDenied)?;

        Ok(JudgeUser {
            user_id: auth.user_id,
            username: auth.username,
            judge_id,
        })
    }
}

/// Caller holding the admin capability.
pub struct AdminUser {
    pub user_id: i32,
    pub username: String,
    pub admin_id: i32,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let admin_id = access::admin_id_for_user(state, auth.user_id)
            .await?
            .ok_or(AppError::PermissionDenied)?;

        Ok(AdminUser {
            user_id: auth.user_id,
            username: auth.username,
            admin_id,
        })
    }
}
