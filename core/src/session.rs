//! Login, registration, logout and session restore.
//!
//! # Design
//! `SessionManager` owns the in-memory `AuthState` and the persisted session
//! keys. The backend does not reliably return a display name, so login walks
//! the `NameSource` chain, falls back to a name derived from the email, and
//! finally asks `GET /usuarios/{id}`, whose answer wins when present.
//!
//! Storage failures are logged and swallowed, except when login persists the
//! name cache, token and session; those propagate.

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::ApiError;
use crate::names::{
    derive_display_name, email_local_part, first_non_empty, looks_unresolved, normalize_email,
    settle_login_name, NameSource,
};
use crate::service::ApiService;
use crate::store::{get_json, keys, set_json, KeyValueStore};
use crate::types::{
    LoginPayload, LoginRequest, RegisterRequest, Session, SessionUser, TempRegistration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Fields a login response must carry.
struct ValidLogin {
    token: String,
    email: String,
    role: String,
    id_usuario: i64,
    nome: Option<String>,
}

impl TryFrom<LoginPayload> for ValidLogin {
    type Error = ApiError;

    fn try_from(payload: LoginPayload) -> Result<Self, ApiError> {
        let missing = payload.missing_fields();
        match (payload.token, payload.email, payload.role, payload.id_usuario) {
            (Some(token), Some(email), Some(role), Some(id_usuario)) if missing.is_empty() => {
                Ok(Self {
                    token,
                    email,
                    role,
                    id_usuario,
                    nome: payload.nome,
                })
            }
            _ => Err(ApiError::InvalidLoginResponse { missing }),
        }
    }
}

pub struct SessionManager {
    api: ApiService,
    state: RwLock<AuthState>,
}

impl SessionManager {
    /// Starts in `Loading`; call `restore` once at launch.
    pub fn new(api: ApiService) -> Self {
        Self {
            api,
            state: RwLock::new(AuthState::Loading),
        }
    }

    pub fn api(&self) -> &ApiService {
        &self.api
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().await.is_some()
    }

    async fn set_state(&self, state: AuthState) -> AuthState {
        *self.state.write().await = state.clone();
        state
    }

    fn store(&self) -> &dyn KeyValueStore {
        self.api.store().as_ref()
    }

    /// Reads the persisted session, repairing its display name when needed.
    /// Any read or parse failure leaves the manager unauthenticated.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> AuthState {
        let store = self.store();
        let (token, user, temp) = futures::join!(
            store.get(keys::TOKEN),
            store.get(keys::USER),
            store.get(keys::USER_TEMP),
        );
        let (token, user, temp) = match (token, user, temp) {
            (Ok(token), Ok(user), Ok(temp)) => (token, user, temp),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                warn!(error = %e, "Could not read stored session");
                return self.set_state(AuthState::Unauthenticated).await;
            }
        };

        let (Some(token), Some(user)) = (token.filter(|t| !t.is_empty()), user) else {
            debug!("No stored session");
            return self.set_state(AuthState::Unauthenticated).await;
        };
        let mut user: SessionUser = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Stored session is not valid JSON");
                return self.set_state(AuthState::Unauthenticated).await;
            }
        };

        self.repair_name(&mut user, temp.as_deref()).await;
        info!(id_usuario = user.id_usuario, "Session restored");
        self.set_state(AuthState::Authenticated(Session { user, token }))
            .await
    }

    async fn repair_name(&self, user: &mut SessionUser, temp: Option<&str>) {
        let store = self.store();
        let normalized = normalize_email(&user.email);

        if let Some(raw) = temp.filter(|_| looks_unresolved(&user.nome, &user.email)) {
            match serde_json::from_str::<TempRegistration>(raw) {
                Ok(pending) if pending.email == normalized => {
                    debug!(source = NameSource::PendingRegistration.as_str(), "Repairing name");
                    user.nome = pending.nome;
                    self.persist_user_quietly(user).await;
                    if let Err(e) = store.remove(keys::USER_TEMP).await {
                        warn!(error = %e, "Could not remove temporary registration");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Temporary registration is not valid JSON"),
            }
        }

        if looks_unresolved(&user.nome, &user.email) && !normalized.is_empty() {
            match store.get(&keys::name_for(&normalized)).await {
                Ok(Some(cached)) if !cached.trim().is_empty() => {
                    debug!(source = NameSource::Cached.as_str(), "Repairing name");
                    user.nome = cached;
                    self.persist_user_quietly(user).await;
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Could not read name cache"),
            }
        }

        if looks_unresolved(&user.nome, &user.email) {
            user.nome = derive_display_name(&user.email);
            debug!("Derived name from email");
            self.persist_user_quietly(user).await;
        }
    }

    async fn persist_user_quietly(&self, user: &SessionUser) {
        if let Err(e) = set_json(self.store(), keys::USER, user).await {
            warn!(error = %e, "Could not persist repaired session");
        }
    }

    /// Authenticates and persists the session.
    ///
    /// Fails with `InvalidLoginResponse` when the response lacks a token,
    /// email, role or user id; nothing is persisted in that case.
    #[instrument(skip(self, senha))]
    pub async fn login(&self, email: &str, senha: &str) -> Result<Session, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            senha: senha.to_string(),
        };
        let login = ValidLogin::try_from(self.api.login(&request).await?).map_err(|e| {
            warn!(error = %e, "Rejecting login response");
            e
        })?;

        let normalized = normalize_email(&login.email);
        let winner = self.resolve_name(&normalized, login.nome.clone()).await;
        let mut nome = settle_login_name(winner, &normalized);
        let store = self.store();
        store.set(&keys::name_for(&normalized), &nome).await?;

        if let Some(remote) = self.remote_name(login.id_usuario, &login.token).await {
            nome = remote;
            store.set(&keys::name_for(&normalized), &nome).await?;
        }
        if nome.trim().is_empty() {
            nome = email_local_part(&login.email).to_string();
        }

        store.set(keys::TOKEN, &login.token).await?;
        let user = SessionUser {
            id_usuario: login.id_usuario,
            email: login.email,
            nome,
            role: login.role,
        };
        set_json(store, keys::USER, &user).await?;
        if let Err(e) = store.remove(keys::USER_TEMP).await {
            debug!(error = %e, "Could not remove temporary registration");
        }

        info!(id_usuario = user.id_usuario, role = %user.role, "Logged in");
        let session = Session {
            user,
            token: login.token,
        };
        self.set_state(AuthState::Authenticated(session.clone()))
            .await;
        Ok(session)
    }

    /// Runs the local name sources in priority order.
    async fn resolve_name(&self, normalized: &str, mut from_response: Option<String>) -> Option<String> {
        let store = self.store();
        let cache_key = keys::name_for(normalized);
        let (cached, pending, previous) = futures::join!(
            store.get(&cache_key),
            get_json::<TempRegistration, _>(store, keys::USER_TEMP),
            get_json::<SessionUser, _>(store, keys::USER),
        );

        let mut cached = cached
            .map_err(|e| warn!(error = %e, "Could not read name cache"))
            .ok()
            .flatten();
        let mut pending = pending
            .map_err(|e| warn!(error = %e, "Could not read temporary registration"))
            .ok()
            .flatten()
            .filter(|temp| temp.email == normalized)
            .map(|temp| temp.nome);
        let mut previous = previous
            .map_err(|e| warn!(error = %e, "Could not read previous session"))
            .ok()
            .flatten()
            .filter(|user| normalize_email(&user.email) == normalized)
            .map(|user| user.nome);

        let (source, name) = first_non_empty(NameSource::LOGIN_ORDER.map(|source| {
            let candidate = match source {
                NameSource::Cached => cached.take(),
                NameSource::PendingRegistration => pending.take(),
                NameSource::PreviousSession => previous.take(),
                NameSource::LoginResponse => from_response.take(),
            };
            (source, candidate)
        }))?;
        debug!(source = source.as_str(), "Resolved display name");
        Some(name)
    }

    /// Authoritative name from `GET /usuarios/{id}`, if the lookup works.
    async fn remote_name(&self, id_usuario: i64, token: &str) -> Option<String> {
        let client = self.api.client();
        let result = self
            .api
            .send_with_token(client.build_get_user(id_usuario), token)
            .await
            .and_then(|response| client.parse_get_user(response));
        match result {
            Ok(record) => record
                .nome
                .map(|nome| nome.trim().to_string())
                .filter(|nome| !nome.is_empty()),
            Err(e) => {
                debug!(error = %e, "User lookup failed, keeping local name");
                None
            }
        }
    }

    /// Registers, then logs in with the same credentials.
    ///
    /// The name is cached and a temporary registration record written before
    /// the remote call, so the login that follows can recover it. On failure
    /// the temporary record is removed; the name cache is kept.
    #[instrument(skip(self, nome, senha))]
    pub async fn register(
        &self,
        nome: &str,
        email: &str,
        senha: &str,
        role: &str,
    ) -> Result<Session, ApiError> {
        let result = self.register_then_login(nome, email, senha, role).await;
        if let Err(e) = &result {
            warn!(error = %e, "Registration failed");
            if let Err(e) = self.store().remove(keys::USER_TEMP).await {
                debug!(error = %e, "Could not remove temporary registration");
            }
        }
        result
    }

    async fn register_then_login(
        &self,
        nome: &str,
        email: &str,
        senha: &str,
        role: &str,
    ) -> Result<Session, ApiError> {
        let normalized = normalize_email(email);
        let trimmed = nome.trim();
        let store = self.store();

        store.set(&keys::name_for(&normalized), trimmed).await?;
        let pending = TempRegistration {
            nome: trimmed.to_string(),
            email: normalized,
            role: role.to_uppercase(),
        };
        set_json(store, keys::USER_TEMP, &pending).await?;

        let request = RegisterRequest {
            nome: nome.to_string(),
            email: email.to_string(),
            senha: senha.to_string(),
            role: role.to_string(),
        };
        self.api.register(&request).await?;
        self.login(email, senha).await
    }

    /// Forgets the session. Safe to call when already logged out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.store().remove(key).await {
                warn!(key, error = %e, "Could not remove stored session");
            }
        }
        self.set_state(AuthState::Unauthenticated).await;
        info!("Logged out");
    }

    /// Drops to `Unauthenticated` when the stored token has gone, which is
    /// what a 401 purge leaves behind.
    pub async fn sync_with_store(&self) -> AuthState {
        let current = self.state().await;
        if current.session().is_none() {
            return current;
        }
        match self.store().get(keys::TOKEN).await {
            Ok(Some(token)) if !token.is_empty() => current,
            Ok(_) => {
                debug!("Stored token gone, dropping session");
                self.set_state(AuthState::Unauthenticated).await
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::service::tests::service;
    use crate::store::MemoryStore;
    use crate::transport::scripted::ScriptedTransport;

    const LOGIN_OK: &str =
        r#"{"Token":"tok-1","Email":"Joao.Silva@X.com","Role":"FREELANCER","IdUsuario":7}"#;

    fn manager(transport: ScriptedTransport) -> (SessionManager, Arc<ScriptedTransport>, Arc<MemoryStore>) {
        let (api, transport, store) = service(transport);
        (SessionManager::new(api), transport, store)
    }

    async fn stored_user(store: &MemoryStore) -> Option<SessionUser> {
        get_json(store, keys::USER).await.unwrap()
    }

    #[tokio::test]
    async fn starts_loading() {
        let (sessions, _, _) = manager(ScriptedTransport::new());
        assert_eq!(sessions.state().await, AuthState::Loading);
    }

    #[tokio::test]
    async fn login_with_missing_fields_persists_nothing() {
        let (sessions, _, store) = manager(
            ScriptedTransport::new().reply(200, r#"{"token":"t","email":"a@x.com"}"#),
        );
        let err = sessions.login("a@x.com", "pw").await.unwrap_err();
        match err {
            ApiError::InvalidLoginResponse { missing } => {
                assert_eq!(missing, vec!["role", "idUsuario"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty().await);
        assert!(!sessions.is_authenticated().await);
    }

    #[tokio::test]
    async fn login_unauthorized_surfaces_invalid_credentials() {
        let (sessions, _, store) = manager(ScriptedTransport::new().reply(401, ""));
        let err = sessions.login("a@x.com", "bad").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials.");
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_derives_name_when_nothing_else_exists() {
        let (sessions, transport, store) =
            manager(ScriptedTransport::new().reply(200, LOGIN_OK).reply(404, ""));
        let session = sessions.login("joao.silva@x.com", "pw").await.unwrap();

        assert_eq!(session.user.nome, "Joao Silva");
        assert_eq!(session.token, "tok-1");
        assert_eq!(store.get(keys::TOKEN).await.unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            store.get(&keys::name_for("joao.silva@x.com")).await.unwrap().as_deref(),
            Some("Joao Silva")
        );
        let lookup = &transport.requests()[1];
        assert!(lookup.path.ends_with("/usuarios/7"));
        assert_eq!(lookup.header("authorization"), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn cached_name_beats_response_and_derivation() {
        let (sessions, _, store) = manager(
            ScriptedTransport::new()
                .reply(
                    200,
                    r#"{"token":"t","email":"ana@x.com","role":"ADMIN","idUsuario":1,"nome":"From Api"}"#,
                )
                .fail(ApiError::Timeout),
        );
        store.set(&keys::name_for("ana@x.com"), "Ana Cached").await.unwrap();
        let session = sessions.login("ana@x.com", "pw").await.unwrap();
        assert_eq!(session.user.nome, "Ana Cached");
    }

    #[tokio::test]
    async fn remote_name_overrides_and_is_cached() {
        let (sessions, _, store) = manager(
            ScriptedTransport::new()
                .reply(200, LOGIN_OK)
                .reply(200, r#"{"data":{"IdUsuario":7,"Nome":"João da Silva"}}"#),
        );
        store.set(&keys::name_for("joao.silva@x.com"), "Joao").await.unwrap();
        let session = sessions.login("joao.silva@x.com", "pw").await.unwrap();
        assert_eq!(session.user.nome, "João da Silva");
        assert_eq!(
            store.get(&keys::name_for("joao.silva@x.com")).await.unwrap().as_deref(),
            Some("João da Silva")
        );
        assert_eq!(stored_user(&store).await.unwrap().nome, "João da Silva");
    }

    #[tokio::test]
    async fn register_then_login_keeps_submitted_name() {
        let (sessions, transport, store) = manager(
            ScriptedTransport::new()
                .reply(201, "")
                .reply(200, LOGIN_OK)
                .reply(404, ""),
        );
        let session = sessions
            .register("  Maria Joana ", "Joao.Silva@X.com ", "pw", "freelancer")
            .await
            .unwrap();

        assert_eq!(session.user.nome, "Maria Joana");
        assert_eq!(stored_user(&store).await.unwrap().nome, "Maria Joana");
        assert!(store.get(keys::USER_TEMP).await.unwrap().is_none());
        assert!(transport.requests()[0].path.ends_with("/auth/register"));
    }

    #[tokio::test]
    async fn register_keeps_short_submitted_name() {
        let (sessions, _, store) = manager(
            ScriptedTransport::new()
                .reply(201, "")
                .reply(
                    200,
                    r#"{"token":"t","email":"robert.king@x.com","role":"CONTRATANTE","idUsuario":3}"#,
                )
                .reply(404, ""),
        );
        let session = sessions
            .register("Li", "robert.king@x.com", "pw", "CONTRATANTE")
            .await
            .unwrap();

        assert_eq!(session.user.nome, "Li");
        assert_eq!(
            store.get(&keys::name_for("robert.king@x.com")).await.unwrap().as_deref(),
            Some("Li")
        );
    }

    #[tokio::test]
    async fn login_accepts_both_casings_in_one_body() {
        let (sessions, _, _) = manager(
            ScriptedTransport::new()
                .reply(
                    200,
                    r#"{"token":"t","Token":"t","email":"ana@x.com","Role":"ADMIN","idUsuario":null,"IdUsuario":4,"nome":null,"Nome":"Ana Souza"}"#,
                )
                .reply(404, ""),
        );
        let session = sessions.login("ana@x.com", "pw").await.unwrap();
        assert_eq!(session.token, "t");
        assert_eq!(session.user.id_usuario, 4);
        assert_eq!(session.user.nome, "Ana Souza");
    }

    #[tokio::test]
    async fn failed_registration_keeps_name_cache_only() {
        let (sessions, _, store) = manager(ScriptedTransport::new().reply(409, "exists"));
        let err = sessions
            .register("Ana", "ana@x.com", "pw", "CONTRATANTE")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 409, .. }));
        assert!(store.get(keys::USER_TEMP).await.unwrap().is_none());
        assert_eq!(
            store.get(&keys::name_for("ana@x.com")).await.unwrap().as_deref(),
            Some("Ana")
        );
    }

    #[tokio::test]
    async fn restore_without_token_is_unauthenticated() {
        let (sessions, _, store) = manager(ScriptedTransport::new());
        store.set(keys::USER, r#"{"idUsuario":1,"email":"a@x.com","nome":"A","role":"ADMIN"}"#)
            .await
            .unwrap();
        assert_eq!(sessions.restore().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn restore_with_corrupt_user_is_unauthenticated() {
        let (sessions, _, store) = manager(ScriptedTransport::new());
        store.set(keys::TOKEN, "t").await.unwrap();
        store.set(keys::USER, "{oops").await.unwrap();
        assert_eq!(sessions.restore().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn restore_adopts_pending_registration_name() {
        let (sessions, _, store) = manager(ScriptedTransport::new());
        store.set(keys::TOKEN, "t").await.unwrap();
        store
            .set(keys::USER, r#"{"idUsuario":2,"email":"Ana@x.com","nome":"Ana","role":"FREELANCER"}"#)
            .await
            .unwrap();
        store
            .set(keys::USER_TEMP, r#"{"nome":"Ana Paula","email":"ana@x.com","role":"FREELANCER"}"#)
            .await
            .unwrap();

        let state = sessions.restore().await;
        assert_eq!(state.session().unwrap().user.nome, "Ana Paula");
        assert_eq!(stored_user(&store).await.unwrap().nome, "Ana Paula");
        assert!(store.get(keys::USER_TEMP).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_falls_back_to_cache_then_derivation() {
        let (sessions, _, store) = manager(ScriptedTransport::new());
        store.set(keys::TOKEN, "t").await.unwrap();
        store
            .set(keys::USER, r#"{"idUsuario":2,"email":"bia.costa@x.com","role":"ADMIN"}"#)
            .await
            .unwrap();
        let state = sessions.restore().await;
        assert_eq!(state.session().unwrap().user.nome, "Bia Costa");

        store.set(&keys::name_for("bia.costa@x.com"), "Beatriz").await.unwrap();
        store
            .set(keys::USER, r#"{"idUsuario":2,"email":"bia.costa@x.com","nome":"","role":"ADMIN"}"#)
            .await
            .unwrap();
        let state = sessions.restore().await;
        assert_eq!(state.session().unwrap().user.nome, "Beatriz");
    }

    #[tokio::test]
    async fn logout_twice_is_fine() {
        let (sessions, _, store) =
            manager(ScriptedTransport::new().reply(200, LOGIN_OK).reply(404, ""));
        sessions.login("joao.silva@x.com", "pw").await.unwrap();
        sessions.logout().await;
        sessions.logout().await;
        assert_eq!(sessions.state().await, AuthState::Unauthenticated);
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());
        assert!(store.get(keys::USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unauthorized_read_drops_session_on_sync() {
        let (sessions, _, store) = manager(
            ScriptedTransport::new()
                .reply(200, LOGIN_OK)
                .reply(404, "")
                .reply(401, ""),
        );
        sessions.login("joao.silva@x.com", "pw").await.unwrap();
        let err = sessions.api().list_profiles().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());
        assert_eq!(sessions.sync_with_store().await, AuthState::Unauthenticated);
    }
}
