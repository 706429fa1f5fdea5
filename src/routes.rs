use axum::Json;
use serde::Serialize;

use crate::session::Session;

/// Pending login notice left in the session by a rejected group login.
#[derive(Debug, Serialize)]
pub struct LoginNotice {
    pub message: Option<String>,
    pub required_identities: Vec<String>,
}

/// Returns and clears the message, and lists the identities the next login
/// must use. The login page reads this before starting the handshake.
pub async fn login_notice(session: Session) -> Json<LoginNotice> {
    Json(LoginNotice {
        message: session.take_message(),
        required_identities: session.required_identities(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}
