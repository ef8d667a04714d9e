//! File-backed credential store
//!
//! Holds a single JSON object with one `token` entry. Writes go through a
//! sibling temp file and a rename so a crash never leaves half a token.
//!
//! The file is read once; afterwards the token is served from memory, so
//! attaching credentials to a request never touches the disk. Changes made
//! to the file by another process are not picked up.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use assessor_core::CredentialStore;
use assessor_domain::{AssessorError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::InfraError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// [`CredentialStore`] persisted to a JSON file
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// `None` until the file has been read; also serializes file access.
    cached: Mutex<Option<Option<String>>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cached: Mutex::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredCredentials> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(StoredCredentials::default()),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(stored) => Ok(stored),
                Err(e) => {
                    // An unreadable file is treated as signed out.
                    warn!(path = %self.path.display(), error = %e, "discarding corrupt credential file");
                    Ok(StoredCredentials::default())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn write(&self, stored: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(InfraError::from)?;
        }

        let body = serde_json::to_vec(stored).map_err(InfraError::from)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, body).map_err(InfraError::from)?;
        restrict_permissions(&staging)?;
        fs::rename(&staging, &self.path).map_err(InfraError::from)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let mut cached = self.cached.lock();
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.read()?.token.filter(|token| !token.is_empty());
        *cached = Some(token.clone());
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(AssessorError::InvalidInput("refusing to store an empty token".into()));
        }
        let mut cached = self.cached.lock();
        self.write(&StoredCredentials { token: Some(token.to_string()) })?;
        *cached = Some(Some(token.to_string()));
        debug!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut cached = self.cached.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "credential cleared"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(InfraError::from(e).into()),
        }
        *cached = Some(None);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(InfraError::from)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
