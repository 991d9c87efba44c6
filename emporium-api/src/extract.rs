//! Request extractors

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has been deserialized and then checked with `validator`
///
/// Malformed JSON and failed rules both reject with a 400 envelope, the
/// latter listing the offending fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Deserializes a string with surrounding whitespace removed
///
/// Use with `deserialize_with` so `validator` length rules see the value that
/// will be stored; a whitespace-only name then fails `length(min = 1)`.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// `Path` whose rejection is the 400 error envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejection is the 400 error envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
