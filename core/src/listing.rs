//! Selection and filtering over normalized listings.

use serde::Serialize;

use crate::views::{MatchView, ProfileView, ProjectView, SkillView};

/// The profile owned by `id_usuario`, if any.
pub fn my_profile(profiles: &[ProfileView], id_usuario: i64) -> Option<&ProfileView> {
    profiles.iter().find(|p| p.id_usuario == Some(id_usuario))
}

pub fn projects_owned_by(projects: &[ProjectView], id_usuario: i64) -> Vec<&ProjectView> {
    projects
        .iter()
        .filter(|p| p.id_usuario_contratante == Some(id_usuario))
        .collect()
}

/// Keeps projects requiring at least one skill that contains, or is
/// contained in, one of `names`, ignoring case. An empty filter keeps
/// everything; projects with no required skills never match a filter.
pub fn filter_projects_by_skills<'a>(
    projects: &'a [ProjectView],
    names: &[String],
) -> Vec<&'a ProjectView> {
    if names.is_empty() {
        return projects.iter().collect();
    }
    let wanted: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    projects
        .iter()
        .filter(|project| {
            project.habilidades_requisitadas.iter().any(|skill| {
                let skill = skill.to_lowercase();
                wanted
                    .iter()
                    .any(|w| skill.contains(w.as_str()) || w.contains(skill.as_str()))
            })
        })
        .collect()
}

/// Catalog names, sorted and deduplicated, for the skill filter.
pub fn skill_names(skills: &[SkillView]) -> Vec<String> {
    let mut names: Vec<String> = skills.iter().map(|s| s.nome.clone()).collect();
    names.sort();
    names.dedup();
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    High,
    Medium,
    Low,
}

impl MatchTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchTier::High
        } else if score >= 60.0 {
            MatchTier::Medium
        } else {
            MatchTier::Low
        }
    }
}

/// A match with the profile it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    #[serde(rename = "match")]
    pub entry: MatchView,
    pub perfil: ProfileView,
    pub tier: MatchTier,
}

/// Pairs each match with its profile, in match order. Matches whose
/// profile is not in `profiles` are dropped.
pub fn join_matches(matches: &[MatchView], profiles: &[ProfileView]) -> Vec<RankedMatch> {
    matches
        .iter()
        .filter_map(|entry| {
            let perfil = profiles.iter().find(|p| p.id_perfil == entry.id_perfil)?;
            Some(RankedMatch {
                entry: entry.clone(),
                perfil: perfil.clone(),
                tier: MatchTier::for_score(entry.score_compatibilidade),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::normalize_list;

    fn projects() -> Vec<ProjectView> {
        normalize_list(&json!([
            { "idProjeto": 1, "idUsuarioContratante": 10, "habilidadesRequisitadas": ["React Native", "SQL"] },
            { "idProjeto": 2, "idUsuarioContratante": 11, "habilidadesRequisitadas": ["rust"] },
            { "idProjeto": 3, "idUsuarioContratante": 10 }
        ]))
    }

    fn ids(projects: &[&ProjectView]) -> Vec<i64> {
        projects.iter().map(|p| p.id_projeto).collect()
    }

    #[test]
    fn skill_filter_matches_substrings_both_ways() {
        let all = projects();
        assert_eq!(ids(&filter_projects_by_skills(&all, &["react".to_string()])), vec![1]);
        assert_eq!(
            ids(&filter_projects_by_skills(&all, &["Rust Async".to_string()])),
            vec![2]
        );
        assert_eq!(ids(&filter_projects_by_skills(&all, &[])), vec![1, 2, 3]);
        assert!(filter_projects_by_skills(&all, &["Go".to_string()]).is_empty());
    }

    #[test]
    fn ownership_selection() {
        let all = projects();
        assert_eq!(ids(&projects_owned_by(&all, 10)), vec![1, 3]);

        let profiles: Vec<ProfileView> =
            normalize_list(&json!([{ "idPerfil": 4, "idUsuario": 9 }, { "idPerfil": 5, "idUsuario": 10 }]));
        assert_eq!(my_profile(&profiles, 10).map(|p| p.id_perfil), Some(5));
        assert!(my_profile(&profiles, 99).is_none());
    }

    #[test]
    fn skill_names_are_sorted_and_unique() {
        let skills = vec![
            SkillView { id: 2, nome: "SQL".to_string() },
            SkillView { id: 1, nome: "Figma".to_string() },
            SkillView { id: 3, nome: "SQL".to_string() },
        ];
        assert_eq!(skill_names(&skills), vec!["Figma".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn join_drops_unknown_profiles_and_tiers_scores() {
        let profiles: Vec<ProfileView> = normalize_list(&json!([{ "idPerfil": 1 }, { "idPerfil": 2 }]));
        let matches = vec![
            MatchView { id_perfil: 2, score_compatibilidade: 80.0, justificativa: String::new() },
            MatchView { id_perfil: 7, score_compatibilidade: 99.0, justificativa: String::new() },
            MatchView { id_perfil: 1, score_compatibilidade: 59.9, justificativa: String::new() },
        ];
        let joined = join_matches(&matches, &profiles);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].tier, MatchTier::High);
        assert_eq!(joined[1].tier, MatchTier::Low);
        assert_eq!(MatchTier::for_score(60.0), MatchTier::Medium);
    }
}
