//! Session-scoped directory of user names and emails.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::SkillSyncClient;
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::service::ApiService;
use crate::types::{Role, Session};
use crate::views::UserInfo;

/// Caches `idUsuario -> UserInfo` for one session. Build a new directory
/// whenever the session changes.
pub struct UserDirectory {
    api: ApiService,
    role: Option<Role>,
    entries: RwLock<HashMap<i64, UserInfo>>,
}

impl UserDirectory {
    /// Seeds the directory with the session user.
    pub fn new(api: ApiService, session: &Session) -> Self {
        let me = UserInfo {
            id_usuario: session.user.id_usuario,
            nome: Some(session.user.nome.clone()).filter(|n| !n.is_empty()),
            email: Some(session.user.email.clone()).filter(|e| !e.is_empty()),
        };
        Self {
            api,
            role: session.role(),
            entries: RwLock::new(HashMap::from([(me.id_usuario, me)])),
        }
    }

    /// Fetches every user. Only admins may list users; for other roles this
    /// is a no-op, and failures leave the cache as it was. Returns the number
    /// of entries loaded.
    pub async fn load_all(&self) -> usize {
        if self.role != Some(Role::Admin) {
            debug!("Skipping user listing for non-admin session");
            return 0;
        }
        let users = match self
            .api
            .query_with(
                self.api.client().build_list_users(),
                &RetryPolicy::no_retry(),
                SkillSyncClient::parse_list_users,
            )
            .await
        {
            Ok(users) => users,
            Err(e @ (ApiError::Unauthorized | ApiError::Forbidden)) => {
                debug!(error = %e, "User listing not permitted");
                return 0;
            }
            Err(e) => {
                warn!(error = %e, "User listing failed");
                return 0;
            }
        };
        let count = users.len();
        let mut entries = self.entries.write().await;
        for user in users {
            entries.insert(user.id_usuario, user);
        }
        count
    }

    /// Cached entry, if any, without touching the network.
    pub async fn get(&self, id_usuario: i64) -> Option<UserInfo> {
        self.entries.read().await.get(&id_usuario).cloned()
    }

    /// Cached entry, or `GET /usuarios/{id}` with one retry.
    pub async fn lookup(&self, id_usuario: i64) -> Result<UserInfo, ApiError> {
        if let Some(info) = self.get(id_usuario).await {
            return Ok(info);
        }
        let record = self
            .api
            .query_with(
                self.api.client().build_get_user(id_usuario),
                &RetryPolicy {
                    max_attempts: 2,
                    ..self.api.read_retry().clone()
                },
                SkillSyncClient::parse_get_user,
            )
            .await?;
        let info = UserInfo {
            id_usuario: record.id_usuario.unwrap_or(id_usuario),
            nome: record.nome,
            email: record.email,
        };
        self.remember(info.clone()).await;
        Ok(info)
    }

    pub async fn remember(&self, info: UserInfo) {
        self.entries.write().await.insert(info.id_usuario, info);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
