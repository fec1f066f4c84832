//! `/auth` endpoints.

use serde_json::Value;

use super::{parse_body, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{LoginPayload, LoginRequest, RegisterRequest};

impl SkillSyncClient {
    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", input)
    }

    /// Decodes the login body without checking required fields; see
    /// `LoginPayload::missing_fields`.
    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginPayload, ApiError> {
        let body = parse_body(&response)?;
        if !body.is_object() {
            return Err(ApiError::InvalidLoginResponse {
                missing: vec!["token", "email", "role", "idUsuario"],
            });
        }
        Ok(LoginPayload::from_value(&body))
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/register", input)
    }

    /// The register body is implementation-defined; it is returned as-is.
    pub fn parse_register(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(&response)
    }
}
