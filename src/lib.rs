pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::get;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::auth_redirect::redirect_auth_exceptions;
use crate::middleware::session_cookie::load_session;
use crate::session::SessionStore;
use crate::state::{AppState, SharedState};

/// Wraps the application's routes with session handling and the auth
/// exception redirects.
pub fn build_app(
    config: Config,
    sessions: Arc<dyn SessionStore>,
    app_routes: Router<SharedState>,
) -> Router {
    match config.group_join_url.as_deref() {
        Some(url) => tracing::info!("Group join URL configured: {url}"),
        None => tracing::info!("No group join URL configured"),
    }

    let state: SharedState = Arc::new(AppState::new(config, sessions));

    Router::new()
        .merge(app_routes)
        .route("/auth/notice", get(routes::login_notice))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            redirect_auth_exceptions,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            load_session,
        ))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
