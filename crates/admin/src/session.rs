//! Persisted admin session.
//!
//! The bearer token survives between runs in a small JSON file readable only
//! by its owner. There is no expiry handling: a stale token surfaces as a
//! 401 from the backend and the user logs in again.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A logged-in admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub access_token: SecretString,
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

impl AdminSession {
    /// A session issued now.
    #[must_use]
    pub fn new(access_token: SecretString, username: impl Into<String>) -> Self {
        Self {
            access_token,
            username: username.into(),
            issued_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    access_token: String,
    username: String,
    issued_at: DateTime<Utc>,
}

/// File slot holding at most one [`AdminSession`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the saved session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<AdminSession>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let file: SessionFile = serde_json::from_str(&contents)?;
        Ok(Some(AdminSession {
            access_token: SecretString::from(file.access_token),
            username: file.username,
            issued_at: file.issued_at,
        }))
    }

    /// Write `session`, replacing any previous one.
    ///
    /// The new session goes to a sibling temp file that is then renamed over
    /// the slot, so a failed write leaves the previous session in place. On
    /// Unix the file is created with mode `0600`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, session: &AdminSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec_pretty(&SessionFile {
            access_token: session.access_token.expose_secret().to_string(),
            username: session.username.clone(),
            issued_at: session.issued_at,
        })?;

        let tmp_path = self.tmp_path();
        // A leftover temp file would defeat `create_new`.
        remove_if_present(&tmp_path).map_err(|e| self.io_error(e))?;
        let written = write_owner_only(&tmp_path, &json).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }
        Ok(())
    }

    /// Delete the saved session. Missing files are fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        remove_if_present(&self.path).map_err(|e| self.io_error(e))
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = owner_only().open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(unix)]
fn owner_only() -> fs::OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    options
}
