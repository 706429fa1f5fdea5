use axum::extract::{Request, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{RedirectDecision, RequestContext};
use crate::error::AppError;
use crate::session::Session;
use crate::state::SharedState;

/// Middleware that turns expired-token and group-auth failures raised by
/// inner handlers into redirects that resume the login flow. Any other
/// response passes through untouched.
///
/// Redirects are sent as `302 Found`.
pub async fn redirect_auth_exceptions(
    State(state): State<SharedState>,
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    let full_path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;
    let Some(error) = response.extensions().get::<AppError>().cloned() else {
        return response;
    };

    let request = RequestContext {
        user: session.user(),
        full_path,
        session,
    };
    let decision = state
        .expired_token
        .handle(&request, &error)
        .or_else(|| state.group_auth.handle(&request, &error));

    let RedirectDecision::Redirect(url) = decision else {
        return response;
    };
    match HeaderValue::try_from(url) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(e) => {
            tracing::warn!("Redirect target is not a valid Location header: {e}");
            response
        }
    }
}
