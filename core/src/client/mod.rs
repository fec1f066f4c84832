//! Stateless request builder and response parser for the SkillSync API.
//!
//! # Design
//! `SkillSyncClient` holds only a `base_url`. Each resource lives in its own
//! submodule and splits every operation into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Bearer tokens are attached later by `ApiService` (or by the native host),
//! so builders never see credentials other than login payloads.

mod auth;
mod dicas;
mod habilidades;
mod perfis;
mod projetos;
mod usuarios;

pub use projetos::DEFAULT_PAGE_SIZE;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize_one, Normalize};

/// Synchronous, stateless client for the SkillSync API.
#[derive(Debug, Clone)]
pub struct SkillSyncClient {
    base_url: String,
}

impl SkillSyncClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.body = Some(body);
        Ok(req)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized),
        403 => Err(ApiError::Forbidden),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Checks the status and decodes the body. An empty body reads as `null`.
pub(crate) fn parse_body(response: &HttpResponse) -> Result<Value, ApiError> {
    check_status(response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Decodes a single record that must carry a valid id.
pub(crate) fn parse_one<T: Normalize>(response: &HttpResponse) -> Result<T, ApiError> {
    let body = parse_body(response)?;
    normalize_one(&body)
        .ok_or_else(|| ApiError::DeserializationError(format!("{} without a valid id", T::KIND)))
}

/// Decodes a record when the server sent one; mutations may answer 204.
pub(crate) fn parse_optional_one<T: Normalize>(
    response: &HttpResponse,
) -> Result<Option<T>, ApiError> {
    let body = parse_body(response)?;
    if body.is_null() {
        return Ok(None);
    }
    Ok(normalize_one(&body))
}
