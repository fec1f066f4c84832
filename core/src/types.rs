//! Wire DTOs and persisted records.
//!
//! # Design
//! Request bodies and persisted records are plain serde structs. Auth and
//! user responses are read from a `Value` with the first usable key among
//! the camelCase and PascalCase spellings, so a body carrying both still
//! decodes. List payloads for profiles, projects, skills and tips go through
//! `normalize`, since the backend varies more there.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{field_i64, field_str};

/// Platform role carried on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Freelancer,
    Contratante,
}

impl Role {
    /// Case-insensitive parse; unknown roles yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "FREELANCER" => Some(Role::Freelancer),
            "CONTRATANTE" => Some(Role::Contratante),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Freelancer => "FREELANCER",
            Role::Contratante => "CONTRATANTE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub role: String,
}

/// Payload for creating or updating a freelancer profile. `habilidades`
/// holds skill ids and is omitted when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub titulo_profissional: String,
    pub resumo: String,
    pub valor_hora: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habilidades: Option<Vec<u64>>,
}

/// Payload for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub titulo: String,
    pub descricao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcamento: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habilidades_requisitadas: Option<Vec<u64>>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`. Every field is optional here; the session
/// layer decides which ones are required.
#[derive(Debug, Clone, Default)]
pub struct LoginPayload {
    pub token: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub id_usuario: Option<i64>,
    pub nome: Option<String>,
}

impl LoginPayload {
    /// Reads each field from the first usable key, so a body carrying both
    /// `token` and `Token` (one of them null) still decodes.
    pub fn from_value(value: &Value) -> Self {
        Self {
            token: field_str(value, &["token", "Token"]),
            email: field_str(value, &["email", "Email"]),
            role: field_str(value, &["role", "Role"]),
            id_usuario: field_i64(value, &["idUsuario", "IdUsuario", "id_usuario"]),
            nome: field_str(value, &["nome", "Nome"]),
        }
    }

    /// Names of the required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.token) {
            missing.push("token");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if blank(&self.role) {
            missing.push("role");
        }
        if self.id_usuario.is_none() {
            missing.push("idUsuario");
        }
        missing
    }
}

/// Body of `GET /usuarios/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id_usuario: Option<i64>,
    pub nome: Option<String>,
    pub email: Option<String>,
}

impl UserRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id_usuario: field_i64(value, &["idUsuario", "IdUsuario", "id_usuario"]),
            nome: field_str(value, &["nome", "Nome"]),
            email: field_str(value, &["email", "Email"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// The user half of a session, stored as JSON under the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id_usuario: i64,
    pub email: String,
    #[serde(default)]
    pub nome: String,
    pub role: String,
}

/// The authenticated session: stored user plus bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.user.role)
    }
}

/// Bridges a registration call and the automatic login that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempRegistration {
    pub nome: String,
    pub email: String,
    pub role: String,
}
