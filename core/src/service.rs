//! Authenticated request pipeline.
//!
//! # Design
//! `ApiService` pairs the stateless `SkillSyncClient` with a `Transport` and
//! the persistent store. Every request picks up the stored bearer token, and
//! any 401 purges the stored token and session before the error reaches the
//! caller. Reads go through `query`, which replays retryable failures under
//! the configured `RetryPolicy`; mutations go through `mutate` and run once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::SkillSyncClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::retry::RetryPolicy;
use crate::store::{keys, KeyValueStore};
use crate::transport::Transport;
use crate::types::{LoginPayload, LoginRequest, ProfileInput, ProjectInput, RegisterRequest, UserRecord};
use crate::views::{MatchView, ProfileView, ProjectView, SkillView, TipView, UserInfo};

#[derive(Clone)]
pub struct ApiService {
    client: SkillSyncClient,
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    read_retry: RetryPolicy,
}

impl ApiService {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            client: SkillSyncClient::new(&config.base_url),
            transport,
            store,
            read_retry: config.read_retry.clone(),
        }
    }

    pub fn client(&self) -> &SkillSyncClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn read_retry(&self) -> &RetryPolicy {
        &self.read_retry
    }

    /// Sends `request` with the stored token, if any. Storage failures are
    /// logged and the request goes out unauthenticated.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = match self.store.get(keys::TOKEN).await {
            Ok(Some(token)) if !token.is_empty() => request.with_bearer(&token),
            Ok(_) => request,
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                request
            }
        };
        self.dispatch(request).await
    }

    /// Sends `request` with an explicit token instead of the stored one.
    pub async fn send_with_token(
        &self,
        request: HttpRequest,
        token: &str,
    ) -> Result<HttpResponse, ApiError> {
        self.dispatch(request.with_bearer(token)).await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.transport.execute(request).await?;
        if response.is_unauthorized() {
            self.purge_session().await;
        }
        Ok(response)
    }

    async fn purge_session(&self) {
        debug!("401 received, purging stored session");
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "Could not purge stored session");
            }
        }
    }

    /// Runs an idempotent read under the configured retry policy.
    pub async fn query<R, F>(&self, request: HttpRequest, parse: F) -> Result<R, ApiError>
    where
        F: Fn(&SkillSyncClient, HttpResponse) -> Result<R, ApiError>,
    {
        self.query_with(request, &self.read_retry, parse).await
    }

    /// Like `query`, with an explicit policy. Non-GET requests always run once.
    pub async fn query_with<R, F>(
        &self,
        request: HttpRequest,
        policy: &RetryPolicy,
        parse: F,
    ) -> Result<R, ApiError>
    where
        F: Fn(&SkillSyncClient, HttpResponse) -> Result<R, ApiError>,
    {
        let max_attempts = if request.method.is_idempotent_read() {
            policy.max_attempts
        } else {
            1
        };
        let mut attempt = 1;
        loop {
            let result = self
                .send(request.clone())
                .await
                .and_then(|response| parse(&self.client, response));
            match result {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    debug!(path = %request.path, attempt, ?delay, error = %e, "Retrying read");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Runs a mutation exactly once.
    pub async fn mutate<R, F>(&self, request: HttpRequest, parse: F) -> Result<R, ApiError>
    where
        F: FnOnce(&SkillSyncClient, HttpResponse) -> Result<R, ApiError>,
    {
        let response = self.send(request).await?;
        parse(&self.client, response)
    }

    // -- auth ---------------------------------------------------------------

    pub async fn login(&self, input: &LoginRequest) -> Result<LoginPayload, ApiError> {
        let request = self.client.build_login(input)?;
        self.mutate(request, SkillSyncClient::parse_login).await
    }

    pub async fn register(&self, input: &RegisterRequest) -> Result<serde_json::Value, ApiError> {
        let request = self.client.build_register(input)?;
        self.mutate(request, SkillSyncClient::parse_register).await
    }

    // -- usuarios -----------------------------------------------------------

    pub async fn get_user(&self, id: i64) -> Result<UserRecord, ApiError> {
        self.query(self.client.build_get_user(id), SkillSyncClient::parse_get_user)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserInfo>, ApiError> {
        self.query(self.client.build_list_users(), SkillSyncClient::parse_list_users)
            .await
    }

    // -- perfis -------------------------------------------------------------

    pub async fn list_profiles(&self) -> Result<Vec<ProfileView>, ApiError> {
        self.query(self.client.build_list_profiles(), SkillSyncClient::parse_list_profiles)
            .await
    }

    pub async fn get_profile(&self, id: i64) -> Result<ProfileView, ApiError> {
        self.query(self.client.build_get_profile(id), SkillSyncClient::parse_get_profile)
            .await
    }

    pub async fn create_profile(&self, input: &ProfileInput) -> Result<ProfileView, ApiError> {
        let request = self.client.build_create_profile(input)?;
        self.mutate(request, SkillSyncClient::parse_create_profile).await
    }

    pub async fn update_profile(
        &self,
        id: i64,
        input: &ProfileInput,
    ) -> Result<Option<ProfileView>, ApiError> {
        let request = self.client.build_update_profile(id, input)?;
        self.mutate(request, SkillSyncClient::parse_update_profile).await
    }

    pub async fn delete_profile(&self, id: i64) -> Result<(), ApiError> {
        self.mutate(self.client.build_delete_profile(id), SkillSyncClient::parse_delete_profile)
            .await
    }

    // -- projetos -----------------------------------------------------------

    pub async fn list_projects(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<ProjectView>, ApiError> {
        self.query(
            self.client.build_list_projects(page_number, page_size),
            SkillSyncClient::parse_list_projects,
        )
        .await
    }

    pub async fn get_project(&self, id: i64) -> Result<ProjectView, ApiError> {
        self.query(self.client.build_get_project(id), SkillSyncClient::parse_get_project)
            .await
    }

    pub async fn create_project(&self, input: &ProjectInput) -> Result<ProjectView, ApiError> {
        let request = self.client.build_create_project(input)?;
        self.mutate(request, SkillSyncClient::parse_create_project).await
    }

    pub async fn update_project(
        &self,
        id: i64,
        input: &ProjectInput,
    ) -> Result<Option<ProjectView>, ApiError> {
        let request = self.client.build_update_project(id, input)?;
        self.mutate(request, SkillSyncClient::parse_update_project).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.mutate(self.client.build_delete_project(id), SkillSyncClient::parse_delete_project)
            .await
    }

    pub async fn generate_matches(&self, project_id: i64) -> Result<Vec<MatchView>, ApiError> {
        self.mutate(
            self.client.build_generate_matches(project_id),
            SkillSyncClient::parse_generate_matches,
        )
        .await
    }

    // -- habilidades / dicas ------------------------------------------------

    pub async fn list_skills(&self) -> Result<Vec<SkillView>, ApiError> {
        self.query(self.client.build_list_skills(), SkillSyncClient::parse_list_skills)
            .await
    }

    pub async fn list_tips(&self) -> Result<Vec<TipView>, ApiError> {
        self.query(self.client.build_list_tips(), SkillSyncClient::parse_list_tips)
            .await
    }

    pub async fn get_tip(&self, id: i64) -> Result<TipView, ApiError> {
        self.query(self.client.build_get_tip(id), SkillSyncClient::parse_get_tip)
            .await
    }
}
