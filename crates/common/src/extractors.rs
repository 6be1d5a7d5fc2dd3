//! Custom axum extractors for Designbase

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use crate::Error;

/// Default page size for list endpoints
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list endpoints
const MAX_LIMIT: i64 = 100;

/// Pagination query parameters for list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Get the offset, defaulting to 0
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Get the limit, defaulting to 50, capped at 100
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// JSON extractor that validates the deserialized value automatically.
///
/// Replaces `Json<T>` + manual `.validate()` calls in handlers.
/// All input errors (deserialization + validation) return 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;
        value
            .validate()
            .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;
        Ok(ValidatedJson(value))
    }
}
