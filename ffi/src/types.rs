//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` field by field with C strings.
//! Parsed payloads cross as a single JSON string tagged by `FfiDataTag`, so
//! the host decodes view models with its own JSON support and the ABI does
//! not grow a struct per resource. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use serde::Serialize;
use skillsync_core::error::ApiError;
use skillsync_core::http::{HttpMethod, HttpRequest};
use skillsync_core::SkillSyncClient;

/// Opaque handle to a `SkillSyncClient` plus the bearer token the host
/// wants attached to authenticated requests.
pub struct FfiSkillSyncClient {
    pub(crate) inner: SkillSyncClient,
    pub(crate) token: Option<String>,
}

impl FfiSkillSyncClient {
    /// Attaches the current token, if any.
    pub(crate) fn authorize(&self, req: HttpRequest) -> HttpRequest {
        match &self.token {
            Some(token) => req.with_bearer(token),
            None => req,
        }
    }
}

/// Allocates a C string, dropping interior NUL bytes.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `skillsync_build_*` functions. The host executes the request
/// and passes the response back through `skillsync_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let path = c_string(&req.path);
        let body = req.body.as_deref().map_or(std::ptr::null_mut(), c_string);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(&k),
                    value: c_string(&v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this after executing a request and passes a pointer
/// to a `skillsync_parse_*` function. The FFI layer reads but does not free
/// these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Unauthorized = 2,
    Forbidden = 3,
    Http = 4,
    Timeout = 5,
    Transport = 6,
    Deserialization = 7,
    Serialization = 8,
    InvalidLoginResponse = 9,
    Storage = 10,
    Panic = 11,
    NullArg = 12,
}

/// Shape of the JSON carried by `FfiResult::json`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Login = 1,
    Register = 2,
    User = 3,
    UserList = 4,
    Profile = 5,
    ProfileList = 6,
    Project = 7,
    ProjectList = 8,
    MatchList = 9,
    SkillList = 10,
    Tip = 11,
    TipList = 12,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, both messages are null, and `json`
/// holds the view model tagged by `data_tag` (null with tag `None` when the
/// server sent nothing). On failure `error_message` describes the error,
/// `user_message` is a short text for an error banner, and `json` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub user_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub json: *mut c_char,
}

impl FfiResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, message: &str, user: &str) -> *mut Self {
        FfiResult {
            error_code,
            error_message: c_string(message),
            user_message: c_string(user),
            http_status,
            data_tag: FfiDataTag::None,
            json: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// Build a success result carrying `value` as JSON. A value that
    /// serializes to `null` yields tag `None`.
    pub(crate) fn ok_json<T: Serialize>(tag: FfiDataTag, value: &T) -> *mut Self {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::Null) => Self::ok_empty(),
            Ok(json) => FfiResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                user_message: std::ptr::null_mut(),
                http_status: 0,
                data_tag: tag,
                json: c_string(&json.to_string()),
            }
            .boxed(),
            Err(e) => Self::from_error(ApiError::SerializationError(e.to_string())),
        }
    }

    /// Build a success result with no payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            user_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::None,
            json: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::Unauthorized => (FfiErrorCode::Unauthorized, 401),
            ApiError::Forbidden => (FfiErrorCode::Forbidden, 403),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::Timeout => (FfiErrorCode::Timeout, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::InvalidLoginResponse { .. } => (FfiErrorCode::InvalidLoginResponse, 0),
            ApiError::Storage(_) => (FfiErrorCode::Storage, 0),
        };
        Self::failure(code, status, &err.to_string(), err.user_message())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(
            FfiErrorCode::NullArg,
            0,
            &format!("null argument: {name}"),
            "Something went wrong. Try again.",
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg, "Something went wrong. Try again.")
    }
}
