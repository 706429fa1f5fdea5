use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use uuid::Uuid;

use crate::session::{SESSION_COOKIE, Session};
use crate::state::SharedState;

/// Middleware that attaches a [`Session`] to every request, issuing a new
/// session cookie when the browser did not send one or sent an id this
/// service could not have minted.
pub async fn load_session(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| is_minted_id(id));
    let fresh = existing.is_none();
    let id = existing.unwrap_or_else(|| Uuid::now_v7().to_string());

    req.extensions_mut()
        .insert(Session::new(id.clone(), state.sessions.clone()));
    let response = next.run(req).await;

    if !fresh {
        return response;
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), response).into_response()
}

/// Ids are v7 UUIDs; anything else is a forged or foreign cookie.
fn is_minted_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok_and(|uuid| uuid.get_version_num() == 7)
}
