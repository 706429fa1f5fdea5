pub mod expired_token;
pub mod failure;
pub mod group_auth;

use crate::session::Session;

/// Outcome of an exception redirector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Redirect(String),
    /// Not handled here; the caller falls back to its default handling.
    NoDecision,
}

impl RedirectDecision {
    pub fn or_else(self, next: impl FnOnce() -> RedirectDecision) -> RedirectDecision {
        match self {
            RedirectDecision::NoDecision => next(),
            decided => decided,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            RedirectDecision::Redirect(url) => Some(url.as_str()),
            RedirectDecision::NoDecision => None,
        }
    }
}

/// The parts of the in-flight request the redirectors look at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: Option<String>,
    /// Path including the query string, as originally requested.
    pub full_path: String,
    pub session: Session,
}

/// Route that starts the login handshake with the identity provider.
pub fn login_begin_url(backend: &str) -> String {
    format!("/login/{backend}/")
}
