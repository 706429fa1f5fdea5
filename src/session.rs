use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dashmap::DashMap;

use crate::error::AppError;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "sessionid";

/// Authenticated user for the session.
pub const SESSION_USER: &str = "_auth_user_id";
/// One-shot message shown on the next page the user sees.
pub const SESSION_MESSAGE: &str = "session_message";
/// Identities the user must pick from on the next login, see [`encode_identities`].
pub const SESSION_REQUIRED_IDENTITIES: &str = "session_required_identities";

const IDENTITY_SEPARATOR: &str = ",";

/// String-keyed storage for per-user sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str, key: &str) -> Option<String>;
    fn set(&self, session_id: &str, key: &str, value: String);
    fn remove(&self, session_id: &str, key: &str) -> Option<String>;
    /// Drop every entry held for the session.
    fn flush(&self, session_id: &str);
}

/// Sessions idle for longer than this are dropped, matching the usual two
/// week session cookie age.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(14 * 24 * 60 * 60);

struct SessionEntry {
    values: HashMap<String, String>,
    touched: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            touched: Instant::now(),
        }
    }
}

/// In-process store. Entries expire after `idle_timeout` without access;
/// expired entries are swept whenever a new session id is first written.
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    idle_timeout: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        entry.touched.elapsed() > self.idle_timeout
    }

    fn sweep_expired(&self) {
        let idle_timeout = self.idle_timeout;
        self.sessions
            .retain(|_, entry| entry.touched.elapsed() <= idle_timeout);
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str, key: &str) -> Option<String> {
        let mut entry = self.sessions.get_mut(session_id)?;
        if self.is_expired(&entry) {
            drop(entry);
            self.sessions.remove(session_id);
            return None;
        }
        entry.touched = Instant::now();
        entry.values.get(key).cloned()
    }

    fn set(&self, session_id: &str, key: &str, value: String) {
        if !self.sessions.contains_key(session_id) {
            self.sweep_expired();
        }
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);
        if self.is_expired(&entry) {
            entry.values.clear();
        }
        entry.touched = Instant::now();
        entry.values.insert(key.to_string(), value);
    }

    fn remove(&self, session_id: &str, key: &str) -> Option<String> {
        let mut entry = self.sessions.get_mut(session_id)?;
        if self.is_expired(&entry) {
            drop(entry);
            self.sessions.remove(session_id);
            return None;
        }
        entry.touched = Instant::now();
        entry.values.remove(key)
    }

    fn flush(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

/// A single browser session bound to its backing store.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

impl Session {
    pub fn new(id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(&self.id, key)
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.store.set(&self.id, key, value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.store.remove(&self.id, key)
    }

    pub fn user(&self) -> Option<String> {
        self.get(SESSION_USER)
    }

    pub fn login(&self, user: impl Into<String>) {
        self.set(SESSION_USER, user);
    }

    /// Ends the authenticated session. Like a framework logout this clears
    /// everything stored for the session, not just the user key.
    pub fn logout(&self) {
        self.store.flush(&self.id);
    }

    pub fn take_message(&self) -> Option<String> {
        self.remove(SESSION_MESSAGE)
    }

    pub fn required_identities(&self) -> Vec<String> {
        self.get(SESSION_REQUIRED_IDENTITIES)
            .map(|raw| decode_identities(&raw))
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))
    }
}

/// Session backends are not guaranteed to round-trip lists, so identity ids
/// are stored as a single comma separated string.
pub fn encode_identities<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(|id| id.as_ref())
        .collect::<Vec<&str>>()
        .join(IDENTITY_SEPARATOR)
}

pub fn decode_identities(raw: &str) -> Vec<String> {
    raw.split(IDENTITY_SEPARATOR)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
