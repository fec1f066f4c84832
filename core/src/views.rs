//! Canonical view models for profiles, projects, skills, tips, users and
//! matches.
//!
//! Each `from_record` lists its accepted keys in lookup order. Serialization
//! always emits camelCase (snake_case for match fields, as the API does).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{
    field, field_f64, field_i64, field_str, field_str_list, Normalize,
    SKILL_NAME_KEYS,
};

static PROFILE_SELF_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/perfis/(\d+)").expect("static regex"));

/// A freelancer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id_perfil: i64,
    pub id_usuario: Option<i64>,
    pub titulo_profissional: String,
    pub resumo: String,
    pub valor_hora: Option<f64>,
    pub data_ultima_atualizacao: Option<String>,
    pub habilidades: Vec<String>,
}

impl Normalize for ProfileView {
    const KIND: &'static str = "perfil";

    fn from_record(record: &Value) -> Option<Self> {
        let id_perfil = field_i64(record, &["idPerfil", "IdPerfil", "id_perfil", "ID_PERFIL"])
            .or_else(|| id_from_self_link(record))?;
        Some(Self {
            id_perfil,
            id_usuario: field_i64(record, &["idUsuario", "IdUsuario", "id_usuario"]),
            titulo_profissional: field_str(
                record,
                &["tituloProfissional", "TituloProfissional", "titulo_profissional"],
            )
            .unwrap_or_default(),
            resumo: field_str(record, &["resumo", "Resumo"]).unwrap_or_default(),
            valor_hora: field_f64(record, &["valorHora", "ValorHora", "valor_hora"]),
            data_ultima_atualizacao: field_str(
                record,
                &[
                    "dataUltimaAtualizacao",
                    "DataUltimaAtualizacao",
                    "data_ultima_atualizacao",
                ],
            ),
            habilidades: field_str_list(record, &["habilidades", "Habilidades"]),
        })
    }
}

/// Recovers a profile id from a HATEOAS `links.self` URL.
fn id_from_self_link(record: &Value) -> Option<i64> {
    let links = field(record, &["links", "Links"])?;
    let href = field_str(links, &["self", "Self"])?;
    let captures = PROFILE_SELF_LINK.captures(&href)?;
    captures.get(1)?.as_str().parse().ok()
}

/// A project posted by a contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id_projeto: i64,
    pub titulo: String,
    pub descricao: String,
    pub orcamento: Option<f64>,
    pub status: Option<String>,
    pub data_publicacao: Option<String>,
    pub id_usuario_contratante: Option<i64>,
    pub habilidades_requisitadas: Vec<String>,
    pub contratante_nome: Option<String>,
    pub contratante_email: Option<String>,
}

impl Normalize for ProjectView {
    const KIND: &'static str = "projeto";

    fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id_projeto: field_i64(record, &["idProjeto", "IdProjeto", "id_projeto"])?,
            titulo: field_str(record, &["titulo", "Titulo"]).unwrap_or_default(),
            descricao: field_str(record, &["descricao", "Descricao"]).unwrap_or_default(),
            orcamento: field_f64(record, &["orcamento", "Orcamento"]),
            status: field_str(record, &["status", "Status"]),
            data_publicacao: field_str(record, &["dataPublicacao", "DataPublicacao", "data_publicacao"]),
            id_usuario_contratante: field_i64(
                record,
                &["idUsuarioContratante", "IdUsuarioContratante", "id_usuario_contratante"],
            ),
            habilidades_requisitadas: field_str_list(
                record,
                &["habilidadesRequisitadas", "HabilidadesRequisitadas", "habilidades_requisitadas"],
            ),
            contratante_nome: field_str(
                record,
                &["contratanteNome", "ContratanteNome", "nomeContratante", "NomeContratante"],
            ),
            contratante_email: field_str(
                record,
                &["contratanteEmail", "ContratanteEmail", "emailContratante", "EmailContratante"],
            ),
        })
    }
}

/// One entry of the skill catalog. Ids are strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillView {
    pub id: u64,
    pub nome: String,
}

impl Normalize for SkillView {
    const KIND: &'static str = "habilidade";

    fn from_record(record: &Value) -> Option<Self> {
        let id = field_i64(record, &["idHabilidade", "IdHabilidade", "id", "id_habilidade"])
            .filter(|id| *id > 0)?;
        let nome = field_str(record, SKILL_NAME_KEYS)?;
        Some(Self {
            id: id as u64,
            nome,
        })
    }
}

/// An AI-generated career tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipView {
    pub id_dica: i64,
    pub titulo: String,
    pub conteudo: String,
    pub data_geracao: Option<String>,
}

impl Normalize for TipView {
    const KIND: &'static str = "dica";

    fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id_dica: field_i64(record, &["idDica", "IdDica", "id_dica", "id"])?,
            titulo: field_str(record, &["titulo", "Titulo"]).unwrap_or_default(),
            conteudo: field_str(record, &["conteudo", "Conteudo"]).unwrap_or_default(),
            data_geracao: field_str(record, &["dataGeracao", "DataGeracao", "data_geracao"]),
        })
    }
}

/// Public identity of a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id_usuario: i64,
    pub nome: Option<String>,
    pub email: Option<String>,
}

impl Normalize for UserInfo {
    const KIND: &'static str = "usuario";

    fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id_usuario: field_i64(record, &["idUsuario", "IdUsuario", "id_usuario"])?,
            nome: field_str(record, &["nome", "Nome"]),
            email: field_str(record, &["email", "Email"]),
        })
    }
}

/// One result of `POST /projetos/{id}/gerar-matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub id_perfil: i64,
    pub score_compatibilidade: f64,
    pub justificativa: String,
}

impl Normalize for MatchView {
    const KIND: &'static str = "match";

    fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id_perfil: field_i64(record, &["id_perfil", "idPerfil", "IdPerfil"])?,
            score_compatibilidade: field_f64(
                record,
                &["score_compatibilidade", "scoreCompatibilidade", "ScoreCompatibilidade"],
            )
            .unwrap_or(0.0),
            justificativa: field_str(record, &["justificativa", "Justificativa"])
                .unwrap_or_default(),
        })
    }
}

/// Extracts match records from the generate-matches body, which wraps them
/// under `matches` (or is a bare list on some deployments).
pub fn match_records(payload: &Value) -> Vec<MatchView> {
    let list = ["matches", "Matches"]
        .iter()
        .find_map(|key| payload.get(key))
        .unwrap_or(payload);
    crate::normalize::normalize_list(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_list, normalize_one};
    use serde_json::json;

    #[test]
    fn profile_without_any_id_is_dropped() {
        let payload = json!([
            { "IdPerfil": 10, "TituloProfissional": "Designer" },
            { "tituloProfissional": "Ghost" }
        ]);
        let profiles: Vec<ProfileView> = normalize_list(&payload);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id_perfil, 10);
        assert_eq!(profiles[0].titulo_profissional, "Designer");
    }

    #[test]
    fn profile_id_recovered_from_self_link() {
        let payload = json!({ "data": [
            { "links": { "self": "https://api/api/v1/perfis/42" }, "resumo": "x" }
        ]});
        let profiles: Vec<ProfileView> = normalize_list(&payload);
        assert_eq!(profiles[0].id_perfil, 42);
    }

    #[test]
    fn pascal_case_profile_matches_camel_case_profile() {
        let camel = json!({
            "idPerfil": 1, "idUsuario": 2, "tituloProfissional": "Dev",
            "resumo": "r", "valorHora": 80, "habilidades": ["Rust"]
        });
        let pascal = json!({
            "IdPerfil": 1, "IdUsuario": 2, "TituloProfissional": "Dev",
            "Resumo": "r", "ValorHora": "80", "Habilidades": ["Rust"]
        });
        assert_eq!(
            ProfileView::from_record(&camel),
            ProfileView::from_record(&pascal)
        );
    }

    #[test]
    fn project_reads_envelope_and_contractor_aliases() {
        let payload = json!({ "Data": [{
            "IdProjeto": 5, "Titulo": "App", "Orcamento": 1500.5,
            "NomeContratante": "Acme", "HabilidadesRequisitadas": ["Rust", "SQL"]
        }]});
        let projects: Vec<ProjectView> = normalize_list(&payload);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].orcamento, Some(1500.5));
        assert_eq!(projects[0].contratante_nome.as_deref(), Some("Acme"));
        assert_eq!(projects[0].habilidades_requisitadas.len(), 2);
    }

    #[test]
    fn skills_need_positive_id_and_name() {
        let payload = json!([
            { "idHabilidade": 1, "nome": "Rust" },
            { "IdHabilidade": "2", "NmHabilidade": "Go" },
            { "id": 0, "nome": "Zero" },
            { "idHabilidade": 4 },
            "Loose"
        ]);
        let skills: Vec<SkillView> = normalize_list(&payload);
        assert_eq!(
            skills,
            vec![
                SkillView { id: 1, nome: "Rust".to_string() },
                SkillView { id: 2, nome: "Go".to_string() },
            ]
        );
    }

    #[test]
    fn single_tip_unwraps_envelope() {
        let tip: TipView =
            normalize_one(&json!({ "data": { "IdDica": 3, "Titulo": "CV", "Conteudo": "..." } }))
                .unwrap();
        assert_eq!(tip.id_dica, 3);
        assert_eq!(tip.titulo, "CV");
    }

    #[test]
    fn matches_are_read_from_wrapper() {
        let payload = json!({ "matches": [
            { "id_perfil": 1, "score_compatibilidade": 91, "justificativa": "Rust" },
            { "score_compatibilidade": 50 }
        ]});
        let matches = match_records(&payload);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score_compatibilidade, 91.0);
    }
}
