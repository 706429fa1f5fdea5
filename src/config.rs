use std::net::IpAddr;
use std::time::Duration;

use crate::session::DEFAULT_IDLE_TIMEOUT;

/// Environment key for the page users are sent to when they need to join a
/// group before they can log in.
pub const GROUP_JOIN_URL_ENV: &str = "SOCIAL_AUTH_GLOBUS_GROUP_JOIN_URL";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Identity provider backend name used to build login routes.
    pub login_backend: String,
    pub secure_cookies: bool,
    /// Idle time after which an in-memory session is dropped.
    pub session_idle_timeout: Duration,
    pub group_join_url: Option<String>,
}

/// Read-only view of the application settings consulted while redirecting.
pub trait PortalSettings: Send + Sync {
    fn group_join_url(&self) -> Option<&str>;
}

impl PortalSettings for Config {
    fn group_join_url(&self) -> Option<&str> {
        self.group_join_url.as_deref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            log_level: "info".to_string(),
            login_backend: "globus".to_string(),
            secure_cookies: false,
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
            group_join_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("PORTAL_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_HOST: {e}"))?;

        let port: u16 = env_or("PORTAL_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_PORT: {e}"))?;

        let log_level = env_or("PORTAL_LOG_LEVEL", "info");

        let login_backend = env_or("PORTAL_LOGIN_BACKEND", "globus");
        if login_backend.trim().is_empty() || login_backend.contains('/') {
            return Err(format!("Invalid PORTAL_LOGIN_BACKEND: '{login_backend}'"));
        }

        let secure_cookies = parse_bool("PORTAL_SECURE_COOKIES", &env_or("PORTAL_SECURE_COOKIES", "false"))?;

        let idle_secs: u64 = env_or(
            "PORTAL_SESSION_IDLE_SECS",
            &DEFAULT_IDLE_TIMEOUT.as_secs().to_string(),
        )
        .parse()
        .map_err(|e| format!("Invalid PORTAL_SESSION_IDLE_SECS: {e}"))?;
        let session_idle_timeout = Duration::from_secs(idle_secs);

        let group_join_url = env_optional(GROUP_JOIN_URL_ENV);

        Ok(Config {
            host,
            port,
            log_level,
            login_backend,
            secure_cookies,
            session_idle_timeout,
            group_join_url,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are both treated as absent.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("Invalid {key}: '{other}'")),
    }
}
