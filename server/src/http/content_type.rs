use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::CONTENT_TYPE, request::Parts},
};

use super::error::ApiError;

/// Rejects requests whose `Content-Type` is present and not JSON.
///
/// Runs before any other extractor touches the backend, so a rejected
/// request never causes a Harvester call.
#[derive(Debug, Clone, Copy)]
pub struct JsonContentType;

pub fn is_json_or_none(content_type: Option<&str>) -> bool {
    content_type.is_none_or(|value| {
        value
            .split(';')
            .next()
            .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for JsonContentType
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .map(|value| value.to_str().unwrap_or_default());

        if is_json_or_none(content_type) {
            Ok(Self)
        } else {
            Err(ApiError::BadRequest(format!(
                "Only accepts Content-Type application/json, was: {}",
                content_type.unwrap_or_default()
            )))
        }
    }
}
