//! `/perfis` endpoints.

use super::{parse_body, parse_one, parse_optional_one, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::normalize_list;
use crate::types::ProfileInput;
use crate::views::ProfileView;

impl SkillSyncClient {
    pub fn build_list_profiles(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/perfis")
    }

    pub fn build_get_profile(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/perfis/{id}"))
    }

    pub fn build_create_profile(&self, input: &ProfileInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/perfis", input)
    }

    pub fn build_update_profile(
        &self,
        id: i64,
        input: &ProfileInput,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/perfis/{id}"), input)
    }

    pub fn build_delete_profile(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/perfis/{id}"))
    }

    pub fn parse_list_profiles(&self, response: HttpResponse) -> Result<Vec<ProfileView>, ApiError> {
        let body = parse_body(&response)?;
        Ok(normalize_list(&body))
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<ProfileView, ApiError> {
        parse_one(&response)
    }

    pub fn parse_create_profile(&self, response: HttpResponse) -> Result<ProfileView, ApiError> {
        parse_one(&response)
    }

    /// `None` when the server answered without a body.
    pub fn parse_update_profile(
        &self,
        response: HttpResponse,
    ) -> Result<Option<ProfileView>, ApiError> {
        parse_optional_one(&response)
    }

    pub fn parse_delete_profile(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_body(&response).map(|_| ())
    }
}
