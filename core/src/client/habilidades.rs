//! `/habilidades` endpoint.

use super::{parse_body, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::normalize_list;
use crate::views::SkillView;

impl SkillSyncClient {
    pub fn build_list_skills(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/habilidades")
    }

    pub fn parse_list_skills(&self, response: HttpResponse) -> Result<Vec<SkillView>, ApiError> {
        let body = parse_body(&response)?;
        Ok(normalize_list(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client, response};

    #[test]
    fn parse_list_skills_bare_array() {
        let skills = client()
            .parse_list_skills(response(
                200,
                r#"[{"idHabilidade":1,"nome":"Rust"},{"IdHabilidade":2,"Nome":"SQL"}]"#,
            ))
            .unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[1].nome, "SQL");
    }
}
