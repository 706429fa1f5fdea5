use std::sync::Arc;

use crate::auth::failure::{GroupAuthFailure, is_redirect_target};
use crate::auth::{RedirectDecision, RequestContext, login_begin_url};
use crate::config::{GROUP_JOIN_URL_ENV, PortalSettings};
use crate::error::AppError;
use crate::session::{SESSION_MESSAGE, SESSION_REQUIRED_IDENTITIES, encode_identities};

const LINKED_IDENTITY_MESSAGE: &str = "Your current account does not have sufficient access to this \
     resource, but one of your linked identities does. Please login with one of those \
     identities listed below.";

/// Handles logins rejected by the group membership check.
///
/// In order:
/// - a linked identity is in an allowed group: store the eligible identity ids
///   in the session and restart login so the user can pick one,
/// - the application has a join URL configured: send the user there,
/// - the failure itself carries a join URL: send the user there,
/// - otherwise warn and leave the error response alone.
#[derive(Clone)]
pub struct GroupAuthFailureRedirector {
    settings: Arc<dyn PortalSettings>,
    backend: String,
}

impl GroupAuthFailureRedirector {
    pub fn new(settings: Arc<dyn PortalSettings>, backend: impl Into<String>) -> Self {
        Self {
            settings,
            backend: backend.into(),
        }
    }

    pub fn handle(&self, request: &RequestContext, error: &AppError) -> RedirectDecision {
        let AppError::AuthForbidden { args } = error else {
            return RedirectDecision::NoDecision;
        };
        let Some(failure) = GroupAuthFailure::from_args(args) else {
            tracing::debug!("Auth forbidden without a failure payload, not redirecting");
            return RedirectDecision::NoDecision;
        };

        if !failure.allowed_user_member_groups.is_empty() {
            // The message has no slot for the names; keep them visible in logs.
            tracing::debug!(
                "Linked identities eligible for login: {:?}",
                failure.usernames()
            );
            request.session.set(SESSION_MESSAGE, LINKED_IDENTITY_MESSAGE);
            request.session.set(
                SESSION_REQUIRED_IDENTITIES,
                encode_identities(&failure.identity_ids()),
            );
            return RedirectDecision::Redirect(login_begin_url(&self.backend));
        }

        if let Some(url) = self.settings.group_join_url().filter(|url| is_redirect_target(url)) {
            return RedirectDecision::Redirect(url.to_string());
        }

        if let Some(url) = failure.group_join_url {
            return RedirectDecision::Redirect(url);
        }

        tracing::warn!(
            "Authenticating to a group failed due to group not being visible and \
             {GROUP_JOIN_URL_ENV} not being set. You should reconfigure one of these."
        );
        RedirectDecision::NoDecision
    }
}
