use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::routing::get;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde_json::json;

use portal_auth::config::Config;
use portal_auth::error::AppError;
use portal_auth::session::{DEFAULT_IDLE_TIMEOUT, MemorySessionStore, Session};
use portal_auth::state::SharedState;

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET without following redirects, sending the session cookie if given.
    pub async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = session {
            req = req.header("cookie", cookie);
        }
        req.send().await.expect("get request failed")
    }

    /// Log in as `user` and return the session cookie pair.
    pub async fn login(&self, user: &str) -> String {
        let resp = self.get(&format!("/test/login/{user}"), None).await;
        assert!(resp.status().is_success(), "login route failed");
        session_cookie(&resp).expect("login did not issue a session cookie")
    }
}

pub fn location(resp: &Response) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("sessionid="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn login(session: Session, Path(user): Path<String>) -> &'static str {
    session.login(user);
    "ok"
}

async fn whoami(session: Session) -> String {
    session.user().unwrap_or_default()
}

async fn expired() -> Result<&'static str, AppError> {
    Err(AppError::ExpiredToken)
}

async fn forbidden_eligible() -> Result<&'static str, AppError> {
    Err(AppError::auth_forbidden(json!({
        "allowed_user_member_groups": [
            {"identity_id": "id1", "username": "alice"},
            {"identity_id": "id2", "username": "bob"},
        ],
        "group_join_url": "https://app.globus.org/join",
    })))
}

async fn forbidden_join() -> Result<&'static str, AppError> {
    Err(AppError::auth_forbidden(json!({
        "allowed_user_member_groups": [],
        "group_join_url": "https://app.globus.org/join",
    })))
}

async fn forbidden_bare() -> Result<&'static str, AppError> {
    Err(AppError::auth_forbidden(json!({})))
}

async fn forbidden_string() -> Result<&'static str, AppError> {
    Err(AppError::auth_forbidden(json!("not a mapping")))
}

async fn forbidden_bad_url() -> Result<&'static str, AppError> {
    Err(AppError::auth_forbidden(json!({
        "group_join_url": "https://x.org/\njoin",
    })))
}

async fn not_found() -> Result<&'static str, AppError> {
    Err(AppError::NotFound("Collection not found".to_string()))
}

fn test_routes() -> Router<SharedState> {
    Router::new()
        .route("/test/login/{user}", get(login))
        .route("/test/whoami", get(whoami))
        .route("/collections/{id}", get(expired))
        .route("/forbidden/eligible", get(forbidden_eligible))
        .route("/forbidden/join", get(forbidden_join))
        .route("/forbidden/bare", get(forbidden_bare))
        .route("/forbidden/string", get(forbidden_string))
        .route("/forbidden/bad-url", get(forbidden_bad_url))
        .route("/missing", get(not_found))
}

/// Spawn a test app on an ephemeral port.
pub async fn spawn_app(group_join_url: Option<&str>) -> TestApp {
    spawn_app_with_idle_timeout(group_join_url, DEFAULT_IDLE_TIMEOUT).await
}

pub async fn spawn_app_with_idle_timeout(
    group_join_url: Option<&str>,
    idle_timeout: Duration,
) -> TestApp {
    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        group_join_url: group_join_url.map(str::to_string),
        ..Config::default()
    };

    let sessions = Arc::new(MemorySessionStore::with_idle_timeout(idle_timeout));
    let app = portal_auth::build_app(config, sessions.clone(), test_routes());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        sessions,
    }
}
