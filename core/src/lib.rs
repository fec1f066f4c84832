//! Client core for the SkillSync freelancer/project matchmaking API.
//!
//! # Overview
//! The `client` module builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network (host-does-IO). On
//! top of it, `ApiService` runs requests through a `Transport`, attaching
//! the stored bearer token and purging the session on 401, and
//! `SessionManager` handles login, registration, logout and restore.
//!
//! # Design
//! - `SkillSyncClient` is stateless; it holds only `base_url`.
//! - Payloads from the backend arrive in camelCase or PascalCase, bare or
//!   wrapped in `data`/`Data`. Auth DTOs use serde aliases; listings go
//!   through `normalize` into the view models in `views`.
//! - Persistent state (token, session, name cache) lives behind
//!   `KeyValueStore`, with in-memory and JSON-file implementations.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod names;
pub mod normalize;
pub mod permissions;
pub mod retry;
pub mod service;
pub mod session;
pub mod skills;
pub mod store;
pub mod transport;
pub mod types;
pub mod users;
pub mod views;

pub use client::SkillSyncClient;
pub use config::ClientConfig;
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
pub use service::ApiService;
pub use session::{AuthState, SessionManager};
pub use skills::SkillSelection;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ProfileInput, ProjectInput, Role, Session, SessionUser};
pub use users::UserDirectory;
pub use views::{MatchView, ProfileView, ProjectView, SkillView, TipView, UserInfo};
