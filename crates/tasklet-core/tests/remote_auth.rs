//! Tests for the HTTP authentication client and the synced flow on top of
//! it, against a mock backend.

use serde_json::json;
use tempfile::TempDir;
use tasklet_core::{
    AppProps, AppWrapper, AuthService, AuthState, Credentials, LocalDb, ProviderType, RemoteApp,
    Screen, SessionStore, SyncConfig, TaskApp, TaskProvider, TaskletError,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_ID: &str = "tasks-test";

fn login_path(provider: &str) -> String {
    format!("/api/client/v2.0/app/{APP_ID}/auth/providers/{provider}/login")
}

async fn mock_login(server: &MockServer, provider: &str, user_id: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(login_path(provider)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "refresh_token": format!("refresh-{token}"),
            "user_id": user_id,
            "device_id": "000000000000000000000000",
        })))
        .mount(server)
        .await;
}

async fn mock_profile(server: &MockServer, token: &str, provider: &str, email: Option<&str>) {
    let data = match email {
        Some(email) => json!({ "email": email }),
        None => json!({}),
    };
    Mock::given(method("GET"))
        .and(path("/api/client/v2.0/auth/profile"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "ignored",
            "identities": [{ "id": "x", "provider_type": provider }],
            "data": data,
            "type": "normal",
        })))
        .mount(server)
        .await;
}

fn app(server: &MockServer) -> RemoteApp {
    RemoteApp::new(&server.uri(), APP_ID).unwrap()
}

#[tokio::test]
async fn test_email_password_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path("local-userpass")))
        .and(body_json(json!({ "username": "ada@example.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-ada",
            "refresh_token": "refresh-ada",
            "user_id": "user-ada",
        })))
        .mount(&server)
        .await;
    mock_profile(&server, "tok-ada", "local-userpass", Some("ada@example.com")).await;

    let app = app(&server);
    assert!(app.current_user().is_none());

    let user = app
        .log_in(&Credentials::email_password("ada@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(user.id, "user-ada");
    assert_eq!(user.provider_type, ProviderType::LocalUserpass);
    assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    assert_eq!(user.display_name(), "ada@example.com");
    assert_eq!(app.current_user().unwrap().id, "user-ada");
}

#[tokio::test]
async fn test_rejected_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path("local-userpass")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid username/password",
            "error_code": "InvalidPassword",
        })))
        .mount(&server)
        .await;

    let app = app(&server);
    let err = app
        .log_in(&Credentials::email_password("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    match err {
        TaskletError::Auth(message) => assert!(message.contains("invalid username/password")),
        other => panic!("expected auth error, got {other:?}"),
    }
    assert!(app.current_user().is_none());
}

#[tokio::test]
async fn test_empty_error_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = app(&server)
        .log_in(&Credentials::anonymous())
        .await
        .unwrap_err();

    match err {
        TaskletError::Auth(message) => {
            assert_eq!(message, "request failed with status 404 Not Found")
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Reserve a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let app = RemoteApp::new(&format!("http://127.0.0.1:{port}"), APP_ID).unwrap();
    let err = app.log_in(&Credentials::anonymous()).await.unwrap_err();
    assert!(matches!(err, TaskletError::Network(_)));
}

#[tokio::test]
async fn test_register_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/api/client/v2.0/app/{APP_ID}/auth/providers/local-userpass/register"
        )))
        .and(body_json(json!({ "email": "new@example.com", "password": "pw123456" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    tokio_test::assert_ok!(app(&server).register_user("new@example.com", "pw123456").await);
}

#[tokio::test]
async fn test_logout_deletes_session_with_refresh_token() {
    let server = MockServer::start().await;
    mock_login(&server, "anon-user", "anon-1", "tok-anon").await;
    mock_profile(&server, "tok-anon", "anon-user", None).await;
    Mock::given(method("DELETE"))
        .and(path("/api/client/v2.0/auth/session"))
        .and(header("Authorization", "Bearer refresh-tok-anon"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let user = app.log_in(&Credentials::anonymous()).await.unwrap();
    assert!(user.is_anonymous());

    tokio_test::assert_ok!(app.log_out().await);
    assert!(app.current_user().is_none());

    // Nothing to log out of
    tokio_test::assert_ok!(app.log_out().await);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    mock_login(&server, "local-userpass", "user-ada", "tok-ada").await;
    mock_profile(&server, "tok-ada", "local-userpass", Some("ada@example.com")).await;

    let temp_dir = TempDir::new().unwrap();
    let session_path = temp_dir.path().join("session.json");

    let first = app(&server).with_session_store(SessionStore::new(&session_path));
    first
        .log_in(&Credentials::email_password("ada@example.com", "secret"))
        .await
        .unwrap();

    let restarted = app(&server).with_session_store(SessionStore::new(&session_path));
    let restored = restarted.current_user().unwrap();
    assert_eq!(restored.id, "user-ada");
    assert_eq!(restored.email.as_deref(), Some("ada@example.com"));
}

#[test]
fn test_from_sync_config_requires_enabled() {
    assert!(matches!(
        RemoteApp::from_sync_config(&SyncConfig::Disabled),
        Err(TaskletError::Config(_))
    ));

    let app = RemoteApp::from_sync_config(&SyncConfig::Enabled {
        app_id: APP_ID.to_string(),
        base_url: "http://localhost:9".to_string(),
        anonymous_auth_enabled: true,
    })
    .unwrap();
    assert_eq!(app.app_id(), APP_ID);
}

#[tokio::test]
async fn test_anonymous_sync_scenario() {
    let server = MockServer::start().await;
    mock_login(&server, "anon-user", "anon-7", "tok-anon").await;
    mock_profile(&server, "tok-anon", "anon-user", None).await;

    let config = SyncConfig::Enabled {
        app_id: APP_ID.to_string(),
        base_url: server.uri(),
        anonymous_auth_enabled: true,
    };
    let mut wrapper = AppWrapper::new(&config, || RemoteApp::from_sync_config(&config)).unwrap();

    // Nothing is rendered until the anonymous login resolves
    assert_eq!(wrapper.screen(), Screen::Placeholder);
    assert!(wrapper.ensure_anonymous_login().await);

    let Screen::Tasks(props) = wrapper.screen() else {
        panic!("expected the task screen after anonymous login");
    };
    assert_eq!(
        props,
        AppProps::SyncEnabled {
            show_login: true,
            show_logout: false,
            current_user_id: "anon-7".to_string(),
            current_user_name: "Anonymous".to_string(),
        }
    );

    let db = LocalDb::new_in_memory().await.unwrap();
    db.run_migrations().await.unwrap();
    let mut app = TaskApp::new(TaskProvider::mount(&db, wrapper.sync_binding()), props);
    app.add("Synced task").await.unwrap();

    let tasks = app.tasks().await.unwrap();
    assert_eq!(tasks[0].user_id.as_deref(), Some("anon-7"));
    assert_eq!(app.provider().partition(), "anon-7");
}

#[tokio::test]
async fn test_invalid_credentials_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path("local-userpass")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid username/password",
        })))
        .mount(&server)
        .await;

    let mut wrapper = AppWrapper::synced(app(&server), false);
    wrapper.handle_login("ada@example.com", "wrong").await;

    assert_eq!(
        wrapper.screen(),
        Screen::Login {
            auth_state: AuthState::LoginError
        }
    );

    wrapper.handle_login("ada@example.com", "wrong-again").await;
    assert_eq!(wrapper.auth_state(), AuthState::LoginError);
}
