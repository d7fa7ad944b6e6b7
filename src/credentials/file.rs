//! File-backed credential persistence.
//!
//! Credentials are kept as pretty-printed JSON in a single file. Writes go to
//! a sibling temporary file that is renamed over the target, so readers see
//! either the old or the new credentials and never a torn write. On unix the
//! file is created `0600`, and loading refuses a file that other users could
//! read.

use super::{CredentialStore, StoredCredentials};
use crate::error::{ClientError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensures that the credentials file has secure permissions (0600 or 0400).
    fn validate_permissions(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            let mode = fs::metadata(path)?.permissions().mode() & 0o777;

            if mode != 0o600 && mode != 0o400 {
                warn!(
                    "Insecure permissions on {}: {:o} (expected 0600)",
                    path.display(),
                    mode
                );
                return Err(ClientError::InsecureCredentials(format!(
                    "{} has mode {:o}; expected 0600 (rw-------)",
                    path.display(),
                    mode
                )));
            }
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn store(&self, credentials: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(credentials)?;
        let temp = self.temp_path();

        {
            let mut file = fs::File::create(&temp).map_err(|e| {
                ClientError::Credentials(format!("Failed to create {}: {}", temp.display(), e))
            })?;

            #[cfg(unix)]
            fs::set_permissions(&temp, fs::Permissions::from_mode(0o600))?;

            file.write_all(json.as_bytes())
                .map_err(|e| ClientError::Credentials(format!("Disk write failure: {}", e)))?;
            file.sync_all()?;
        }

        fs::rename(&temp, &self.path)?;
        debug!("Stored credentials at {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        Self::validate_permissions(&self.path)?;

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ClientError::Credentials(format!("Failed to read credentials: {}", e))
        })?;

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            ClientError::Credentials(format!("Invalid credentials JSON format: {}", e))
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed credentials at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
