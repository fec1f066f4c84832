//! Role checks for profile and project actions.

use crate::types::{Role, Session};
use crate::views::{ProfileView, ProjectView};

pub fn can_create_profile(session: &Session) -> bool {
    matches!(session.role(), Some(Role::Admin | Role::Freelancer))
}

pub fn can_create_project(session: &Session) -> bool {
    matches!(session.role(), Some(Role::Admin | Role::Contratante))
}

/// Admins, or the freelancer who owns the profile. Covers delete as well.
pub fn can_edit_profile(session: &Session, profile: &ProfileView) -> bool {
    match session.role() {
        Some(Role::Admin) => true,
        Some(Role::Freelancer) => profile.id_usuario == Some(session.user.id_usuario),
        _ => false,
    }
}

/// Admins, or the contractor who posted the project. Covers delete as well.
pub fn can_edit_project(session: &Session, project: &ProjectView) -> bool {
    match session.role() {
        Some(Role::Admin) => true,
        Some(Role::Contratante) => {
            project.id_usuario_contratante == Some(session.user.id_usuario)
        }
        _ => false,
    }
}

pub fn can_generate_matches(session: &Session) -> bool {
    matches!(session.role(), Some(Role::Admin | Role::Contratante))
}

/// Whether the profile owner's name and email are shown.
pub fn can_view_profile_contact(session: &Session) -> bool {
    matches!(session.role(), Some(Role::Admin | Role::Contratante))
}

/// Whether the project contractor's name and email are shown.
pub fn can_view_project_contact(session: &Session) -> bool {
    matches!(session.role(), Some(Role::Admin | Role::Freelancer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionUser;

    fn session(role: &str, id: i64) -> Session {
        Session {
            user: SessionUser {
                id_usuario: id,
                email: "u@x.com".to_string(),
                nome: "U".to_string(),
                role: role.to_string(),
            },
            token: "t".to_string(),
        }
    }

    fn profile(owner: Option<i64>) -> ProfileView {
        ProfileView {
            id_perfil: 1,
            id_usuario: owner,
            titulo_profissional: String::new(),
            resumo: String::new(),
            valor_hora: None,
            data_ultima_atualizacao: None,
            habilidades: Vec::new(),
        }
    }

    fn project(owner: Option<i64>) -> ProjectView {
        ProjectView {
            id_projeto: 1,
            titulo: String::new(),
            descricao: String::new(),
            orcamento: None,
            status: None,
            data_publicacao: None,
            id_usuario_contratante: owner,
            habilidades_requisitadas: Vec::new(),
            contratante_nome: None,
            contratante_email: None,
        }
    }

    #[test]
    fn creation_rights_follow_role() {
        assert!(can_create_profile(&session("FREELANCER", 1)));
        assert!(!can_create_profile(&session("CONTRATANTE", 1)));
        assert!(can_create_project(&session("CONTRATANTE", 1)));
        assert!(!can_create_project(&session("FREELANCER", 1)));
        assert!(can_create_project(&session("ADMIN", 1)));
        assert!(!can_create_profile(&session("GUEST", 1)));
    }

    #[test]
    fn owners_and_admins_edit() {
        assert!(can_edit_profile(&session("FREELANCER", 5), &profile(Some(5))));
        assert!(!can_edit_profile(&session("FREELANCER", 5), &profile(Some(6))));
        assert!(!can_edit_profile(&session("CONTRATANTE", 5), &profile(Some(5))));
        assert!(can_edit_profile(&session("ADMIN", 1), &profile(None)));

        assert!(can_edit_project(&session("CONTRATANTE", 8), &project(Some(8))));
        assert!(!can_edit_project(&session("CONTRATANTE", 8), &project(None)));
        assert!(!can_edit_project(&session("FREELANCER", 8), &project(Some(8))));
    }

    #[test]
    fn contact_visibility_is_cross_role() {
        assert!(can_view_profile_contact(&session("CONTRATANTE", 1)));
        assert!(!can_view_profile_contact(&session("FREELANCER", 1)));
        assert!(can_view_project_contact(&session("FREELANCER", 1)));
        assert!(!can_view_project_contact(&session("CONTRATANTE", 1)));
        assert!(can_generate_matches(&session("ADMIN", 1)));
        assert!(!can_generate_matches(&session("FREELANCER", 1)));
    }
}
