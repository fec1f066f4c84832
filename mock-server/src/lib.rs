//! In-memory implementation of the SkillSync REST API, for tests and local
//! runs.
//!
//! Routes live under `/api/v1`. Login answers without a `nome`, like the
//! real backend, and projects come wrapped in a paged envelope. `Casing`
//! picks between camelCase and PascalCase bodies so clients can be tested
//! against both.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@skillsync.dev";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Key style of response bodies. Match results are always snake_case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Casing {
    #[default]
    Camel,
    Pascal,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id_usuario: i64,
    pub nome: String,
    pub email: String,
    pub role: String,
    #[serde(skip)]
    pub senha: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Perfil {
    pub id_perfil: i64,
    pub id_usuario: i64,
    pub titulo_profissional: String,
    pub resumo: String,
    pub valor_hora: f64,
    pub data_ultima_atualizacao: String,
    pub habilidades: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projeto {
    pub id_projeto: i64,
    pub id_usuario_contratante: i64,
    pub titulo: String,
    pub descricao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcamento: Option<f64>,
    pub status: String,
    pub data_publicacao: String,
    pub habilidades_requisitadas: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Habilidade {
    pub id_habilidade: i64,
    pub nome: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dica {
    pub id_dica: i64,
    pub titulo: String,
    pub conteudo: String,
    pub data_geracao: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub senha: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfilInput {
    pub titulo_profissional: String,
    #[serde(default)]
    pub resumo: String,
    pub valor_hora: f64,
    #[serde(default)]
    pub habilidades: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjetoInput {
    pub titulo: String,
    #[serde(default)]
    pub descricao: String,
    pub orcamento: Option<f64>,
    #[serde(default)]
    pub habilidades_requisitadas: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Default)]
pub struct Db {
    pub users: BTreeMap<i64, User>,
    pub tokens: BTreeMap<String, i64>,
    pub perfis: BTreeMap<i64, Perfil>,
    pub projetos: BTreeMap<i64, Projeto>,
    pub habilidades: Vec<Habilidade>,
    pub dicas: Vec<Dica>,
    next_id: i64,
}

impl Db {
    /// Catalog, tips and one admin account.
    pub fn seeded() -> Self {
        let mut db = Db::default();
        db.habilidades = ["Rust", "React Native", "SQL", "Figma", "Python"]
            .iter()
            .enumerate()
            .map(|(i, nome)| Habilidade {
                id_habilidade: i as i64 + 1,
                nome: nome.to_string(),
            })
            .collect();
        db.dicas = vec![
            Dica {
                id_dica: 1,
                titulo: "Destaque resultados".to_string(),
                conteudo: "Descreva projetos entregues com números concretos.".to_string(),
                data_geracao: today(),
            },
            Dica {
                id_dica: 2,
                titulo: "Mantenha o perfil atualizado".to_string(),
                conteudo: "Revise suas habilidades a cada novo projeto.".to_string(),
                data_geracao: today(),
            },
        ];
        let id = db.next_id();
        db.users.insert(
            id,
            User {
                id_usuario: id,
                nome: "Administrador".to_string(),
                email: ADMIN_EMAIL.to_string(),
                role: "ADMIN".to_string(),
                senha: ADMIN_PASSWORD.to_string(),
            },
        );
        db
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn skill_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.habilidades.iter().find(|h| h.id_habilidade == *id))
            .map(|h| h.nome.clone())
            .collect()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
    pub casing: Casing,
}

pub fn app() -> Router {
    app_with(Casing::Camel)
}

pub fn app_with(casing: Casing) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Db::seeded())),
        casing,
    };
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/usuarios", get(list_usuarios))
        .route("/usuarios/{id}", get(get_usuario))
        .route("/perfis", get(list_perfis).post(create_perfil))
        .route(
            "/perfis/{id}",
            get(get_perfil).put(update_perfil).delete(delete_perfil),
        )
        .route("/projetos", get(list_projetos).post(create_projeto))
        .route(
            "/projetos/{id}",
            get(get_projeto).put(update_projeto).delete(delete_projeto),
        )
        .route("/projetos/{id}/gerar-matches", post(gerar_matches))
        .route("/habilidades", get(list_habilidades))
        .route("/dicas", get(list_dicas))
        .route("/dicas/{id}", get(get_dica));
    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, casing: Casing) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(casing)).await
}

type ApiResult = Result<Response, StatusCode>;

fn today() -> String {
    "2025-01-01T00:00:00".to_string()
}

/// Renders `value` in the configured casing.
fn body(state: &AppState, status: StatusCode, value: impl Serialize) -> ApiResult {
    let value = serde_json::to_value(value).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let value = match state.casing {
        Casing::Camel => value,
        Casing::Pascal => pascal_keys(value),
    };
    Ok((status, Json(value)).into_response())
}

fn pascal_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (capitalize(&key), pascal_keys(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(pascal_keys).collect()),
        other => other,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolves the bearer token to a user, or 401.
async fn caller(state: &AppState, headers: &HeaderMap) -> Result<User, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let db = state.db.read().await;
    db.tokens
        .get(token)
        .and_then(|id| db.users.get(id))
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)
}

fn require_role(user: &User, roles: &[&str]) -> Result<(), StatusCode> {
    if roles.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

// --- auth ---

async fn register(State(state): State<AppState>, Json(input): Json<RegisterInput>) -> ApiResult {
    let role = input.role.trim().to_uppercase();
    if !["FREELANCER", "CONTRATANTE"].contains(&role.as_str()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let email = input.email.trim().to_lowercase();
    let mut db = state.db.write().await;
    if db.users.values().any(|u| u.email == email) {
        return Err(StatusCode::CONFLICT);
    }
    let id = db.next_id();
    db.users.insert(
        id,
        User {
            id_usuario: id,
            nome: input.nome.trim().to_string(),
            email,
            role,
            senha: input.senha,
        },
    );
    info!(id_usuario = id, "Registered user");
    body(&state, StatusCode::CREATED, json!({ "message": "Usuário registrado" }))
}

async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> ApiResult {
    let email = input.email.trim().to_lowercase();
    let mut db = state.db.write().await;
    let user = db
        .users
        .values()
        .find(|u| u.email == email && u.senha == input.senha)
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let token = Uuid::new_v4().simple().to_string();
    db.tokens.insert(token.clone(), user.id_usuario);
    info!(id_usuario = user.id_usuario, "Issued token");
    body(
        &state,
        StatusCode::OK,
        json!({
            "token": token,
            "email": user.email,
            "role": user.role,
            "idUsuario": user.id_usuario,
        }),
    )
}

// --- usuarios ---

async fn list_usuarios(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    let me = caller(&state, &headers).await?;
    require_role(&me, &["ADMIN"])?;
    let users: Vec<User> = state.db.read().await.users.values().cloned().collect();
    body(&state, StatusCode::OK, json!({ "data": users }))
}

async fn get_usuario(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    caller(&state, &headers).await?;
    let user = state.db.read().await.users.get(&id).cloned();
    let user = user.ok_or(StatusCode::NOT_FOUND)?;
    body(&state, StatusCode::OK, user)
}

// --- perfis ---

async fn list_perfis(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    caller(&state, &headers).await?;
    let perfis: Vec<Perfil> = state.db.read().await.perfis.values().cloned().collect();
    body(&state, StatusCode::OK, perfis)
}

async fn get_perfil(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    caller(&state, &headers).await?;
    let perfil = state.db.read().await.perfis.get(&id).cloned();
    body(&state, StatusCode::OK, perfil.ok_or(StatusCode::NOT_FOUND)?)
}

async fn create_perfil(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<PerfilInput>,
) -> ApiResult {
    let me = caller(&state, &headers).await?;
    require_role(&me, &["ADMIN", "FREELANCER"])?;
    let mut db = state.db.write().await;
    let id = db.next_id();
    let perfil = Perfil {
        id_perfil: id,
        id_usuario: me.id_usuario,
        titulo_profissional: input.titulo_profissional,
        resumo: input.resumo,
        valor_hora: input.valor_hora,
        data_ultima_atualizacao: today(),
        habilidades: db.skill_names(&input.habilidades),
    };
    db.perfis.insert(id, perfil.clone());
    body(&state, StatusCode::CREATED, perfil)
}

async fn update_perfil(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<PerfilInput>,
) -> ApiResult {
    let me = caller(&state, &headers).await?;
    let mut db = state.db.write().await;
    let habilidades = db.skill_names(&input.habilidades);
    let perfil = db.perfis.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if me.role != "ADMIN" && perfil.id_usuario != me.id_usuario {
        return Err(StatusCode::FORBIDDEN);
    }
    perfil.titulo_profissional = input.titulo_profissional;
    perfil.resumo = input.resumo;
    perfil.valor_hora = input.valor_hora;
    perfil.habilidades = habilidades;
    perfil.data_ultima_atualizacao = today();
    let perfil = perfil.clone();
    body(&state, StatusCode::OK, perfil)
}

async fn delete_perfil(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let me = caller(&state, &headers).await?;
    let mut db = state.db.write().await;
    let owner = db.perfis.get(&id).ok_or(StatusCode::NOT_FOUND)?.id_usuario;
    if me.role != "ADMIN" && owner != me.id_usuario {
        return Err(StatusCode::FORBIDDEN);
    }
    db.perfis.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// --- projetos ---

async fn list_projetos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> ApiResult {
    caller(&state, &headers).await?;
    let page_number = paging.page_number.unwrap_or(1).max(1);
    let page_size = paging.page_size.unwrap_or(10).max(1);
    let db = state.db.read().await;
    let page: Vec<Projeto> = db
        .projetos
        .values()
        .skip((page_number - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();
    let total = db.projetos.len();
    drop(db);
    body(
        &state,
        StatusCode::OK,
        json!({
            "data": page,
            "pageNumber": page_number,
            "pageSize": page_size,
            "totalCount": total,
        }),
    )
}

async fn get_projeto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    caller(&state, &headers).await?;
    let projeto = state.db.read().await.projetos.get(&id).cloned();
    body(&state, StatusCode::OK, projeto.ok_or(StatusCode::NOT_FOUND)?)
}

async fn create_projeto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProjetoInput>,
) -> ApiResult {
    let me = caller(&state, &headers).await?;
    require_role(&me, &["ADMIN", "CONTRATANTE"])?;
    let mut db = state.db.write().await;
    let id = db.next_id();
    let projeto = Projeto {
        id_projeto: id,
        id_usuario_contratante: me.id_usuario,
        titulo: input.titulo,
        descricao: input.descricao,
        orcamento: input.orcamento,
        status: "ABERTO".to_string(),
        data_publicacao: today(),
        habilidades_requisitadas: db.skill_names(&input.habilidades_requisitadas),
    };
    db.projetos.insert(id, projeto.clone());
    body(&state, StatusCode::CREATED, projeto)
}

async fn update_projeto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<ProjetoInput>,
) -> Result<StatusCode, StatusCode> {
    let me = caller(&state, &headers).await?;
    let mut db = state.db.write().await;
    let habilidades = db.skill_names(&input.habilidades_requisitadas);
    let projeto = db.projetos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if me.role != "ADMIN" && projeto.id_usuario_contratante != me.id_usuario {
        return Err(StatusCode::FORBIDDEN);
    }
    projeto.titulo = input.titulo;
    projeto.descricao = input.descricao;
    projeto.orcamento = input.orcamento;
    projeto.habilidades_requisitadas = habilidades;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_projeto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let me = caller(&state, &headers).await?;
    let mut db = state.db.write().await;
    let owner = db
        .projetos
        .get(&id)
        .ok_or(StatusCode::NOT_FOUND)?
        .id_usuario_contratante;
    if me.role != "ADMIN" && owner != me.id_usuario {
        return Err(StatusCode::FORBIDDEN);
    }
    db.projetos.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

/// Scores every profile by the share of required skills it covers.
pub fn score_matches(projeto: &Projeto, perfis: &[Perfil]) -> Vec<Value> {
    let required: Vec<String> = projeto
        .habilidades_requisitadas
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    if required.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(f64, &Perfil, Vec<&String>)> = perfis
        .iter()
        .filter_map(|perfil| {
            let common: Vec<&String> = perfil
                .habilidades
                .iter()
                .filter(|h| required.contains(&h.to_lowercase()))
                .collect();
            if common.is_empty() {
                return None;
            }
            let score = (common.len() as f64 * 100.0 / required.len() as f64).round();
            Some((score, perfil, common))
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .map(|(score, perfil, common)| {
            let names: Vec<&str> = common.iter().map(|s| s.as_str()).collect();
            json!({
                "id_perfil": perfil.id_perfil,
                "score_compatibilidade": score,
                "justificativa": format!("Habilidades em comum: {}", names.join(", ")),
            })
        })
        .collect()
}

async fn gerar_matches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    let me = caller(&state, &headers).await?;
    require_role(&me, &["ADMIN", "CONTRATANTE"])?;
    let db = state.db.read().await;
    let projeto = db.projetos.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let perfis: Vec<Perfil> = db.perfis.values().cloned().collect();
    let matches = score_matches(projeto, &perfis);
    debug!(id_projeto = id, count = matches.len(), "Generated matches");
    Ok(Json(json!({ "matches": matches })).into_response())
}

// --- habilidades / dicas ---

async fn list_habilidades(State(state): State<AppState>) -> ApiResult {
    let habilidades = state.db.read().await.habilidades.clone();
    body(&state, StatusCode::OK, habilidades)
}

async fn list_dicas(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    caller(&state, &headers).await?;
    let dicas = state.db.read().await.dicas.clone();
    body(&state, StatusCode::OK, json!({ "data": dicas }))
}

async fn get_dica(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    caller(&state, &headers).await?;
    let dica = state
        .db
        .read()
        .await
        .dicas
        .iter()
        .find(|d| d.id_dica == id)
        .cloned();
    body(&state, StatusCode::OK, dica.ok_or(StatusCode::NOT_FOUND)?)
}
