//! Cached role hint, readable synchronously before the session resolves.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use placemate_auth::Role;

/// Persistent slot holding the last role the server reported at login.
///
/// Implementations never fail loudly: a hint that cannot be read is simply
/// absent, and the guards fall back to the session's own role.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// The raw hint as stored, if any.
    fn cached_role_hint(&self) -> Option<String>;

    fn remember_role(&self, role: Role);

    /// Drop the hint. Must be called whenever the session is invalidated.
    fn invalidate(&self);
}

/// In-process store; the hint dies with the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    hint: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary raw hint (e.g. one left over from an earlier login).
    pub fn with_hint(hint: impl Into<String>) -> Self {
        Self {
            hint: Mutex::new(Some(hint.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn cached_role_hint(&self) -> Option<String> {
        self.hint.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn remember_role(&self, role: Role) {
        *self.hint.lock().unwrap_or_else(PoisonError::into_inner) = Some(role.as_str().to_string());
    }

    fn invalidate(&self) {
        *self.hint.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    role: Option<String>,
}

/// JSON file store: `{app_data_dir}/placemate/session.json` by default.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the OS app data directory, if one can be resolved.
    pub fn default_location() -> Option<Self> {
        let mut dir = dirs::data_dir().or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })?;
        dir.push("placemate");
        dir.push("session.json");
        Some(Self::at(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> io::Result<Option<PersistedSession>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, session: &PersistedSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, payload)
    }
}

impl SessionStore for FileSessionStore {
    fn cached_role_hint(&self) -> Option<String> {
        match self.read() {
            Ok(session) => session.and_then(|s| s.role),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable session file; ignoring role hint");
                None
            }
        }
    }

    fn remember_role(&self, role: Role) {
        let session = PersistedSession {
            role: Some(role.as_str().to_string()),
        };
        if let Err(err) = self.write(&session) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist role hint");
        }
    }

    fn invalidate(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to clear session file");
            }
        }
    }
}
