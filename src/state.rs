use std::sync::Arc;

use crate::auth::expired_token::ExpiredTokenRedirector;
use crate::auth::group_auth::GroupAuthFailureRedirector;
use crate::config::Config;
use crate::session::SessionStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub expired_token: ExpiredTokenRedirector,
    pub group_auth: GroupAuthFailureRedirector,
}

impl AppState {
    pub fn new(config: Config, sessions: Arc<dyn SessionStore>) -> Self {
        let expired_token = ExpiredTokenRedirector::new(config.login_backend.clone());
        let group_auth =
            GroupAuthFailureRedirector::new(Arc::new(config.clone()), config.login_backend.clone());
        Self {
            config,
            sessions,
            expired_token,
            group_auth,
        }
    }
}
