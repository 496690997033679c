//! Durable session records
//!
//! Two records live side by side: the raw bearer token and the user identity
//! as JSON. They are written together on login, removed together on logout
//! and only ever read as a pair.

use crate::error::{Result, SyncError};
use ohako_core::UserIdentity;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const TOKEN_FILE: &str = "token";
const USER_FILE: &str = "user.json";

/// Both halves of a persisted session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: UserIdentity,
}

/// Backing store for the session records
pub trait SessionStorage: Send + Sync {
    /// Read both records; `None` when either is missing
    fn load(&self) -> Result<Option<StoredSession>>;

    /// Write both records
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Remove both records
    fn clear(&self) -> Result<()>;
}

/// Session records as two files in a directory
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_if_present(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // Write to a sibling temp file and rename over the target.
    fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        let token = Self::read_optional(&self.token_path())?;
        let user = Self::read_optional(&self.user_path())?;

        match (token, user) {
            (Some(token), Some(user)) => {
                let token = token.trim().to_string();
                if token.is_empty() {
                    return Err(SyncError::Storage("token record is empty".into()));
                }
                let user: UserIdentity = serde_json::from_str(&user)?;
                Ok(Some(StoredSession { token, user }))
            }
            (None, None) => Ok(None),
            (token, _) => {
                let leftover = if token.is_some() { TOKEN_FILE } else { USER_FILE };
                warn!(
                    dir = %self.dir.display(),
                    leftover,
                    "Discarding partial session record"
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let user = serde_json::to_vec(&session.user)?;
        // the token goes last: until it lands the pair reads as partial
        Self::remove_if_present(&self.token_path())?;
        Self::write_atomic(&self.user_path(), &user)?;
        Self::write_atomic(&self.token_path(), session.token.as_bytes())?;
        debug!(dir = %self.dir.display(), user_id = %session.user.id, "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Self::remove_if_present(&self.token_path())?;
        Self::remove_if_present(&self.user_path())?;
        debug!(dir = %self.dir.display(), "Session records removed");
        Ok(())
    }
}

/// In-process session records
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage, as if a previous run had logged in
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredSession>>> {
        self.inner
            .lock()
            .map_err(|_| SyncError::Storage("session storage lock poisoned".into()))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
