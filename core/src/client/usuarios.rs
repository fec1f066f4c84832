//! `/usuarios` endpoints.

use super::{parse_body, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize_list, unwrap_record};
use crate::types::UserRecord;
use crate::views::UserInfo;

impl SkillSyncClient {
    pub fn build_get_user(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/usuarios/{id}"))
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        let body = parse_body(&response)?;
        let record = unwrap_record(&body);
        if !record.is_object() {
            return Err(ApiError::DeserializationError(
                "user body is not an object".to_string(),
            ));
        }
        Ok(UserRecord::from_value(record))
    }

    /// Admin only; other roles get 401 or 403.
    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/usuarios")
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<UserInfo>, ApiError> {
        let body = parse_body(&response)?;
        Ok(normalize_list(&body))
    }
}
