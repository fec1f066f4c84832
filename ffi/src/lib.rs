//! C-ABI wrapper around `skillsync-core`.
//!
//! # Overview
//! Exposes the SkillSync request builders and response parsers through
//! `extern "C"` functions so a native host (the mobile shell) can perform
//! HTTP itself and still share one implementation of endpoint paths,
//! payload shapes and response normalization.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - The client handle carries the bearer token set through
//!   `skillsync_client_set_token`; every non-auth builder attaches it.
//! - A single `FfiResult` envelope conveys errors and a tagged JSON payload.
//! - The host owns all returned pointers and must call the matching
//!   `skillsync_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use serde_json::{json, Value};
use skillsync_core::error::ApiError;
use skillsync_core::http::{HttpRequest, HttpResponse};
use skillsync_core::names::derive_display_name;
use skillsync_core::skills::coerce_skill_ids;
use skillsync_core::types::{LoginRequest, ProfileInput, ProjectInput, RegisterRequest};
use skillsync_core::SkillSyncClient;

use types::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Borrows a C string as UTF-8. Null and invalid UTF-8 read as `None`.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn read_json<T: serde::de::DeserializeOwned>(ptr: *const c_char) -> Option<T> {
    serde_json::from_str(read_str(ptr)?).ok()
}

/// Runs a builder against the client handle. `authorized` requests get the
/// handle's bearer token.
fn build_request<F>(
    client: *const FfiSkillSyncClient,
    authorized: bool,
    build: F,
) -> *mut FfiHttpRequest
where
    F: FnOnce(&SkillSyncClient) -> Option<HttpRequest>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(req) if authorized => FfiHttpRequest::from_core(client.authorize(req)),
            Some(req) => FfiHttpRequest::from_core(req),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or_default().to_string(),
    }
}

/// Runs a parser and wraps its outcome in an `FfiResult`.
fn parse_response<T, F>(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
    tag: FfiDataTag,
    operation: &str,
    parse: F,
) -> *mut FfiResult
where
    T: Serialize,
    F: FnOnce(&SkillSyncClient, HttpResponse) -> Result<T, ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        match parse(&client.inner, resp) {
            Ok(value) => FfiResult::ok_json(tag, &value),
            Err(e) => FfiResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {operation}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client handle bound to `base_url` (e.g.
/// `http://10.0.2.2:5000/api/v1`).
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `skillsync_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_client_new(base_url: *const c_char) -> *mut FfiSkillSyncClient {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiSkillSyncClient {
            inner: SkillSyncClient::new(url),
            token: None,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client handle created by `skillsync_client_new`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_client_free(client: *mut FfiSkillSyncClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Set the bearer token attached by later builders. Null or blank clears it.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_client_set_token(client: *mut FfiSkillSyncClient, token: *const c_char) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &mut *client };
        client.token = read_str(token)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }));
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build `POST /auth/login`. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_login(
    client: *const FfiSkillSyncClient,
    email: *const c_char,
    senha: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, false, |c| {
        let input = LoginRequest {
            email: read_str(email)?.to_string(),
            senha: read_str(senha)?.to_string(),
        };
        c.build_login(&input).ok()
    })
}

/// Build `POST /auth/register`. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_register(
    client: *const FfiSkillSyncClient,
    nome: *const c_char,
    email: *const c_char,
    senha: *const c_char,
    role: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, false, |c| {
        let input = RegisterRequest {
            nome: read_str(nome)?.to_string(),
            email: read_str(email)?.to_string(),
            senha: read_str(senha)?.to_string(),
            role: read_str(role)?.to_string(),
        };
        c.build_register(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_get_user(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_get_user(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_list_users(client: *const FfiSkillSyncClient) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_list_users()))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_list_profiles(
    client: *const FfiSkillSyncClient,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_list_profiles()))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_get_profile(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_get_profile(id)))
}

/// Build `POST /perfis` from a JSON `ProfileInput`
/// (`{"tituloProfissional", "resumo", "valorHora", "habilidades"}`).
///
/// Returns null if the input is null or does not decode.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_create_profile(
    client: *const FfiSkillSyncClient,
    input_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| {
        let input: ProfileInput = read_json(input_json)?;
        c.build_create_profile(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_update_profile(
    client: *const FfiSkillSyncClient,
    id: i64,
    input_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| {
        let input: ProfileInput = read_json(input_json)?;
        c.build_update_profile(id, &input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_delete_profile(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_delete_profile(id)))
}

/// Build the paged `GET /projetos`. Hosts without paging pass page 1 and
/// `skillsync_default_page_size()`.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_list_projects(
    client: *const FfiSkillSyncClient,
    page_number: u32,
    page_size: u32,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_list_projects(page_number, page_size)))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_get_project(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_get_project(id)))
}

/// Build `POST /projetos` from a JSON `ProjectInput`
/// (`{"titulo", "descricao", "orcamento", "habilidadesRequisitadas"}`).
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_create_project(
    client: *const FfiSkillSyncClient,
    input_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| {
        let input: ProjectInput = read_json(input_json)?;
        c.build_create_project(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_update_project(
    client: *const FfiSkillSyncClient,
    id: i64,
    input_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| {
        let input: ProjectInput = read_json(input_json)?;
        c.build_update_project(id, &input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_delete_project(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_delete_project(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_generate_matches(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_generate_matches(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_list_skills(client: *const FfiSkillSyncClient) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_list_skills()))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_list_tips(client: *const FfiSkillSyncClient) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_list_tips()))
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_build_get_tip(
    client: *const FfiSkillSyncClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_request(client, true, |c| Some(c.build_get_tip(id)))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse a login response. On success `json` holds
/// `{"token", "email", "role", "idUsuario", "nome"}`; a body missing any
/// required field yields `InvalidLoginResponse`.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_login(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::Login, "skillsync_parse_login", |c, r| {
        let payload = c.parse_login(r)?;
        let missing = payload.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::InvalidLoginResponse { missing });
        }
        Ok(json!({
            "token": payload.token,
            "email": payload.email,
            "role": payload.role,
            "idUsuario": payload.id_usuario,
            "nome": payload.nome,
        }))
    })
}

/// Parse a register response. The body is passed through unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_register(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::Register, "skillsync_parse_register", |c, r| {
        c.parse_register(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_get_user(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::User, "skillsync_parse_get_user", |c, r| {
        c.parse_get_user(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_list_users(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::UserList, "skillsync_parse_list_users", |c, r| {
        c.parse_list_users(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_list_profiles(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::ProfileList,
        "skillsync_parse_list_profiles",
        |c, r| c.parse_list_profiles(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_get_profile(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::Profile, "skillsync_parse_get_profile", |c, r| {
        c.parse_get_profile(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_create_profile(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::Profile,
        "skillsync_parse_create_profile",
        |c, r| c.parse_create_profile(r),
    )
}

/// Tag `None` when the server answered without a body.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_update_profile(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::Profile,
        "skillsync_parse_update_profile",
        |c, r| c.parse_update_profile(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_delete_profile(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::None,
        "skillsync_parse_delete_profile",
        |c, r| c.parse_delete_profile(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_list_projects(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::ProjectList,
        "skillsync_parse_list_projects",
        |c, r| c.parse_list_projects(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_get_project(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::Project, "skillsync_parse_get_project", |c, r| {
        c.parse_get_project(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_create_project(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::Project,
        "skillsync_parse_create_project",
        |c, r| c.parse_create_project(r),
    )
}

/// Tag `None` when the server answered without a body.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_update_project(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::Project,
        "skillsync_parse_update_project",
        |c, r| c.parse_update_project(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_delete_project(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::None,
        "skillsync_parse_delete_project",
        |c, r| c.parse_delete_project(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_generate_matches(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(
        client,
        response,
        FfiDataTag::MatchList,
        "skillsync_parse_generate_matches",
        |c, r| c.parse_generate_matches(r),
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_list_skills(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::SkillList, "skillsync_parse_list_skills", |c, r| {
        c.parse_list_skills(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_list_tips(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::TipList, "skillsync_parse_list_tips", |c, r| {
        c.parse_list_tips(r)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_parse_get_tip(
    client: *const FfiSkillSyncClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, FfiDataTag::Tip, "skillsync_parse_get_tip", |c, r| {
        c.parse_get_tip(r)
    })
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn skillsync_default_page_size() -> u32 {
    skillsync_core::client::DEFAULT_PAGE_SIZE
}

/// Display name derived from an email local part (`joao.silva@x.com` gives
/// `Joao Silva`). Returns null if `email` is null.
/// Free the result with `skillsync_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_derive_display_name(email: *const c_char) -> *mut c_char {
    catch_unwind(|| match read_str(email) {
        Some(email) => c_string(&derive_display_name(email)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Coerces a JSON array of raw skill ids to a JSON array of positive,
/// distinct integers. Returns null if the input is not a JSON array.
/// Free the result with `skillsync_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_coerce_skill_ids(ids_json: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(Value::Array(raw)) = read_json::<Value>(ids_json) else {
            return std::ptr::null_mut();
        };
        c_string(&json!(coerce_skill_ids(&raw)).to_string())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `skillsync_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_string(req.path);
        free_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_string(h.key);
                free_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by any `skillsync_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_string(result.error_message);
        free_string(result.user_message);
        free_string(result.json);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn skillsync_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_string(s));
}

fn free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
