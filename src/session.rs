//! Persisted sign-in session and the request context that reads it
//!
//! The session is one JSON object on disk. [`RequestContext`] holds the
//! in-memory copy and is the only place the API client reads the bearer token
//! from, so signing in or out takes effect on the next request without
//! rebuilding the client.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_name: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_name,
            role: None,
            saved_at: chrono::Utc::now(),
        }
    }

    /// Short stable identifier for logs; the token itself is never logged
    pub fn fingerprint(&self) -> String {
        token_fingerprint(&self.access_token)
    }
}

// Tokens must not leak through `{:?}`
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.fingerprint())
            .field("user_name", &self.user_name)
            .field("role", &self.role)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// First 12 hex chars of the token's SHA-256
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().take(6).map(|b| format!("{:02x}", b)).collect()
}

/// Location of `session.json` on disk
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/storedesk/session.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("storedesk").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session. A missing file is "signed out"; a corrupt one is logged and ignored.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                tracing::debug!(session = %session.fingerprint(), "Loaded session");
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        tracing::info!(session = %session.fingerprint(), "Session saved");
        Ok(())
    }

    /// Remove the session file. Returns false if there was none.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", self.path)),
        }
    }
}

/// Shared handle to the current session, injected into the API client
#[derive(Clone, Default)]
pub struct RequestContext {
    session: Arc<RwLock<Option<Session>>>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Load whatever the store holds (possibly nothing)
    pub fn from_store(store: &SessionStore) -> Self {
        match store.load() {
            Some(session) => Self::with_session(session),
            None => Self::anonymous(),
        }
    }

    /// Token to send as `Authorization: Bearer`, read at dispatch time
    pub fn bearer_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn current(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("session", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let dir = std::env::temp_dir().join(format!(
            "storedesk-session-{}-{}",
            name,
            std::process::id()
        ));
        SessionStore::new(dir.join("session.json"))
    }

    #[test]
    fn save_load_clear() {
        let store = temp_store("roundtrip");
        let _ = store.clear();
        assert!(store.load().is_none());

        let session = Session::new("tok-123", Some("lan".into()));
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());
        let _ = store.clear();
    }

    #[test]
    fn context_is_single_read_path() {
        let ctx = RequestContext::anonymous();
        assert_eq!(ctx.bearer_token(), None);

        let shared = ctx.clone();
        ctx.set_session(Session::new("abc", None));
        assert_eq!(shared.bearer_token().as_deref(), Some("abc"));

        shared.clear();
        assert_eq!(ctx.bearer_token(), None);
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::new("super-secret-token", None);
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains(&session.fingerprint()));
        assert_eq!(session.fingerprint().len(), 12);
    }
}
