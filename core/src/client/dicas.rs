//! `/dicas` endpoints.

use super::{parse_body, parse_one, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::normalize_list;
use crate::views::TipView;

impl SkillSyncClient {
    pub fn build_list_tips(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/dicas")
    }

    pub fn build_get_tip(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/dicas/{id}"))
    }

    pub fn parse_list_tips(&self, response: HttpResponse) -> Result<Vec<TipView>, ApiError> {
        let body = parse_body(&response)?;
        Ok(normalize_list(&body))
    }

    pub fn parse_get_tip(&self, response: HttpResponse) -> Result<TipView, ApiError> {
        parse_one(&response)
    }
}
