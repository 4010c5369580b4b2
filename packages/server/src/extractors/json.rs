use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// A `Json<T>` wrapper that converts deserialization errors into `AppError::Validation`,
/// ensuring clients always receive structured JSON error responses.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(AppJson(value))
    }
}

/// Like [`AppJson`], but the raw payload goes through [`common::sanitize`]
/// before it is deserialized into `T`.
///
/// Use for free-form text supplied by clients (names, descriptions, comments).
/// Not for credentials: escaping would alter them.
pub struct SanitizedJson<T>(pub T);

impl<S, T> FromRequest<S> for SanitizedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(raw) = AppJson::<Value>::from_request(req, state).await?;
        let clean = common::sanitize(&raw)?;
        let value = serde_json::from_value(clean)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
        Ok(SanitizedJson(value))
    }
}
