//! End-to-end flows against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `SessionManager` and
//! `ApiService` over real HTTP with `ReqwestTransport`. Validates that request
//! building, token handling and response normalization agree with the
//! server, in both camelCase and PascalCase modes.

use std::sync::Arc;
use std::time::Duration;

use mock_server::{Casing, ADMIN_EMAIL, ADMIN_PASSWORD};
use skillsync_core::client::DEFAULT_PAGE_SIZE;
use skillsync_core::listing::{join_matches, my_profile, MatchTier};
use skillsync_core::store::keys;
use skillsync_core::{
    ApiError, ApiService, AuthState, ClientConfig, KeyValueStore, MemoryStore, ProfileInput,
    ProjectInput, ReqwestTransport, RetryPolicy, SessionManager, SkillSelection, UserDirectory,
};

async fn spawn_server(casing: Casing) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::serve(listener, casing));
    format!("http://{addr}/api/v1")
}

fn session_manager(base_url: &str, store: Arc<MemoryStore>) -> SessionManager {
    let config = ClientConfig::new(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_read_retry(RetryPolicy::new(2).with_base_delay(Duration::from_millis(10)));
    let transport = Arc::new(ReqwestTransport::new(config.timeout).unwrap());
    SessionManager::new(ApiService::new(&config, transport, store))
}

#[tokio::test]
async fn register_login_and_restore() {
    let base_url = spawn_server(Casing::Camel).await;
    let store = Arc::new(MemoryStore::new());
    let sessions = session_manager(&base_url, store.clone());

    let session = sessions
        .register("Maria Silva", "maria.s@x.com", "pw", "FREELANCER")
        .await
        .unwrap();
    // the server knows the registered name, so the lookup confirms it
    assert_eq!(session.user.nome, "Maria Silva");
    assert_eq!(session.user.role, "FREELANCER");
    assert!(store.get(keys::USER_TEMP).await.unwrap().is_none());

    // a fresh manager over the same store restores the session
    let restored = session_manager(&base_url, store.clone());
    match restored.restore().await {
        AuthState::Authenticated(s) => assert_eq!(s, session),
        other => panic!("expected a session, got {other:?}"),
    }

    sessions.logout().await;
    sessions.logout().await;
    assert_eq!(restored.restore().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let base_url = spawn_server(Casing::Camel).await;
    let sessions = session_manager(&base_url, Arc::new(MemoryStore::new()));
    let err = sessions.login(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!sessions.is_authenticated().await);
}

#[tokio::test]
async fn stale_token_is_purged() {
    let base_url = spawn_server(Casing::Camel).await;
    let store = Arc::new(MemoryStore::new());
    let sessions = session_manager(&base_url, store.clone());
    sessions.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    store.set(keys::TOKEN, "revoked").await.unwrap();
    let err = sessions.api().list_tips().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(store.get(keys::TOKEN).await.unwrap().is_none());
    assert!(store.get(keys::USER).await.unwrap().is_none());
    assert_eq!(sessions.sync_with_store().await, AuthState::Unauthenticated);
}

async fn marketplace_flow(casing: Casing) {
    let base_url = spawn_server(casing).await;

    let freelancer = session_manager(&base_url, Arc::new(MemoryStore::new()));
    let ana = freelancer
        .register("Ana Lima", "ana@x.com", "pw", "freelancer")
        .await
        .unwrap();
    let contractor = session_manager(&base_url, Arc::new(MemoryStore::new()));
    contractor
        .register("Caio Reis", "caio@x.com", "pw", "CONTRATANTE")
        .await
        .unwrap();

    // catalog and selection
    let catalog = freelancer.api().list_skills().await.unwrap();
    let rust = catalog.iter().find(|s| s.nome == "Rust").unwrap().id;
    let mut selection = SkillSelection::from_ids(&[]);
    selection.toggle(&serde_json::json!(rust.to_string()));

    let created = freelancer
        .api()
        .create_profile(&ProfileInput {
            titulo_profissional: "Backend".to_string(),
            resumo: "APIs em Rust".to_string(),
            valor_hora: 120.0,
            habilidades: selection.payload(),
        })
        .await
        .unwrap();
    assert_eq!(created.habilidades, vec!["Rust".to_string()]);

    let profiles = freelancer.api().list_profiles().await.unwrap();
    let mine = my_profile(&profiles, ana.user.id_usuario).unwrap();
    assert_eq!(mine.id_perfil, created.id_perfil);

    let project = contractor
        .api()
        .create_project(&ProjectInput {
            titulo: "API".to_string(),
            descricao: "Serviço em Rust".to_string(),
            orcamento: Some(5000.0),
            habilidades_requisitadas: Some(vec![rust]),
        })
        .await
        .unwrap();

    let projects = freelancer
        .api()
        .list_projects(1, DEFAULT_PAGE_SIZE)
        .await
        .unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].orcamento, Some(5000.0));

    let matches = contractor
        .api()
        .generate_matches(project.id_projeto)
        .await
        .unwrap();
    let joined = join_matches(&matches, &profiles);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].tier, MatchTier::High);

    // update answers 204; delete then 404
    let updated = contractor
        .api()
        .update_project(
            project.id_projeto,
            &ProjectInput {
                titulo: "API v2".to_string(),
                ..ProjectInput::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_none());
    contractor
        .api()
        .delete_project(project.id_projeto)
        .await
        .unwrap();
    let err = contractor
        .api()
        .get_project(project.id_projeto)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let tips = freelancer.api().list_tips().await.unwrap();
    assert!(!tips.is_empty());
    let tip = freelancer.api().get_tip(tips[0].id_dica).await.unwrap();
    assert_eq!(tip.titulo, tips[0].titulo);
}

#[tokio::test]
async fn marketplace_flow_camel_case() {
    marketplace_flow(Casing::Camel).await;
}

#[tokio::test]
async fn marketplace_flow_pascal_case() {
    marketplace_flow(Casing::Pascal).await;
}

#[tokio::test]
async fn user_directory_by_role() {
    let base_url = spawn_server(Casing::Pascal).await;

    let freelancer = session_manager(&base_url, Arc::new(MemoryStore::new()));
    let ana = freelancer
        .register("Ana Lima", "ana@x.com", "pw", "FREELANCER")
        .await
        .unwrap();
    let users = UserDirectory::new(freelancer.api().clone(), &ana);
    assert_eq!(users.load_all().await, 0);
    let admin_info = users.lookup(1).await.unwrap();
    assert_eq!(admin_info.nome.as_deref(), Some("Administrador"));

    let admin = session_manager(&base_url, Arc::new(MemoryStore::new()));
    let admin_session = admin.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(admin_session.user.nome, "Administrador");
    let users = UserDirectory::new(admin.api().clone(), &admin_session);
    assert_eq!(users.load_all().await, 2);
    assert_eq!(
        users.get(ana.user.id_usuario).await.unwrap().email.as_deref(),
        Some("ana@x.com")
    );
}
