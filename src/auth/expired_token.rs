use crate::auth::{RedirectDecision, RequestContext, login_begin_url};
use crate::error::AppError;

/// Sends users whose access token expired back through login, returning them
/// to the page they asked for afterwards. A user still signed in at the
/// identity provider only sees a slower request.
#[derive(Debug, Clone)]
pub struct ExpiredTokenRedirector {
    backend: String,
}

impl ExpiredTokenRedirector {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn handle(&self, request: &RequestContext, error: &AppError) -> RedirectDecision {
        if !matches!(error, AppError::ExpiredToken) {
            return RedirectDecision::NoDecision;
        }

        tracing::info!(
            "Tokens expired for user {}, redirecting to login.",
            request.user.as_deref().unwrap_or("AnonymousUser")
        );
        request.session.logout();

        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &request.full_path)
            .finish();
        RedirectDecision::Redirect(format!("{}?{params}", login_begin_url(&self.backend)))
    }
}
