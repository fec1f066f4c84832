//! `/projetos` endpoints, including match generation.

use super::{parse_body, parse_one, parse_optional_one, SkillSyncClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::normalize_list;
use crate::types::ProjectInput;
use crate::views::{match_records, MatchView, ProjectView};

/// Page requested by the listing screens.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

impl SkillSyncClient {
    pub fn build_list_projects(&self, page_number: u32, page_size: u32) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/projetos?pageNumber={page_number}&pageSize={page_size}"),
        )
    }

    pub fn build_get_project(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/projetos/{id}"))
    }

    pub fn build_create_project(&self, input: &ProjectInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/projetos", input)
    }

    pub fn build_update_project(
        &self,
        id: i64,
        input: &ProjectInput,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/projetos/{id}"), input)
    }

    pub fn build_delete_project(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/projetos/{id}"))
    }

    /// POST without a body; the server computes matches for the project.
    pub fn build_generate_matches(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("/projetos/{id}/gerar-matches"))
    }

    pub fn parse_list_projects(&self, response: HttpResponse) -> Result<Vec<ProjectView>, ApiError> {
        let body = parse_body(&response)?;
        Ok(normalize_list(&body))
    }

    pub fn parse_get_project(&self, response: HttpResponse) -> Result<ProjectView, ApiError> {
        parse_one(&response)
    }

    pub fn parse_create_project(&self, response: HttpResponse) -> Result<ProjectView, ApiError> {
        parse_one(&response)
    }

    pub fn parse_update_project(
        &self,
        response: HttpResponse,
    ) -> Result<Option<ProjectView>, ApiError> {
        parse_optional_one(&response)
    }

    pub fn parse_delete_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_body(&response).map(|_| ())
    }

    pub fn parse_generate_matches(&self, response: HttpResponse) -> Result<Vec<MatchView>, ApiError> {
        let body = parse_body(&response)?;
        Ok(match_records(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client, response};
    use super::*;

    #[test]
    fn build_list_projects_carries_paging() {
        let req = client().build_list_projects(1, DEFAULT_PAGE_SIZE);
        assert_eq!(
            req.path,
            "http://localhost:3000/api/v1/projetos?pageNumber=1&pageSize=100"
        );
    }

    #[test]
    fn build_generate_matches_posts_without_body() {
        let req = client().build_generate_matches(7);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/v1/projetos/7/gerar-matches");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_project_omits_missing_budget() {
        let input = ProjectInput {
            titulo: "Site".to_string(),
            descricao: "Landing page".to_string(),
            orcamento: None,
            habilidades_requisitadas: Some(vec![2]),
        };
        let req = client().build_create_project(&input).unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("orcamento").is_none());
        assert_eq!(body["habilidadesRequisitadas"], serde_json::json!([2]));
    }

    #[test]
    fn parse_list_projects_reads_pascal_envelope() {
        let projects = client()
            .parse_list_projects(response(
                200,
                r#"{"Data":[{"IdProjeto":3,"Titulo":"App","Status":"ABERTO"}],"PageNumber":1}"#,
            ))
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].status.as_deref(), Some("ABERTO"));
    }

    #[test]
    fn parse_generate_matches_reads_scores() {
        let matches = client()
            .parse_generate_matches(response(
                200,
                r#"{"matches":[{"id_perfil":4,"score_compatibilidade":87.5,"justificativa":"Rust"}]}"#,
            ))
            .unwrap();
        assert_eq!(matches[0].id_perfil, 4);
        assert_eq!(matches[0].score_compatibilidade, 87.5);
    }

    #[test]
    fn parse_generate_matches_server_error() {
        let err = client().parse_generate_matches(response(500, "boom")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }
}
