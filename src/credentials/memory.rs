// In-memory credential store

use super::{CredentialStore, StoredCredentials};
use crate::error::Result;
use parking_lot::RwLock;

/// Keeps credentials for the lifetime of the process.
///
/// Used for tests and for one-shot CLI invocations that pass a token
/// explicitly and should not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            credentials: RwLock::new(Some(StoredCredentials::new(token))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn store(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.credentials.write() = Some(credentials.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.credentials.read().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.credentials.write() = None;
        Ok(())
    }
}
