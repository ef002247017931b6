//! OS keychain backed [`SecureStore`]
//!
//! macOS Keychain, Windows Credential Manager and the Secret Service on
//! Linux, through the `keyring` crate. Values are base64 encoded because the
//! keychains only hold strings. Keychain calls block (D-Bus on Linux), so
//! they run on the blocking thread pool.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, warn};

use crate::filesystem::APP_DIR_NAME;

#[derive(Debug, Clone)]
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service_name(APP_DIR_NAME)
    }

    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Runs `operation` against the keychain entry of `key`
    async fn with_entry<T, F>(&self, key: &str, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> keyring::Result<T> + Send + 'static,
    {
        let service_name = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service_name, &key).map_err(keyring_error)?;
            operation(&entry).map_err(keyring_error)
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Keyring task failed: {}", e)))?
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn keyring_error(e: keyring::Error) -> BridgeError {
    BridgeError::OperationFailed(format!("Keyring error: {}", e))
}

/// Maps "no such entry" to `None`
fn optional<T>(result: keyring::Result<T>) -> keyring::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let encoded = STANDARD.encode(value);
        self.with_entry(key, move |entry| entry.set_password(&encoded))
            .await?;

        debug!(key = key, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(encoded) = self
            .with_entry(key, |entry| optional(entry.get_password()))
            .await?
        else {
            debug!(key = key, "No secret in keyring");
            return Ok(None);
        };

        let decoded = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
            warn!(key = key, error = %e, "Stored secret is not valid base64");
            BridgeError::OperationFailed(format!("Failed to decode secret: {}", e))
        })?;
        Ok(Some(decoded))
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        let deleted = self
            .with_entry(key, |entry| optional(entry.delete_credential()))
            .await?;

        debug!(key = key, existed = deleted.is_some(), "Deleted secret from keyring");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names() {
        assert_eq!(KeyringSecureStore::new().service_name, APP_DIR_NAME);
        assert_eq!(
            KeyringSecureStore::with_service_name("player-tests").service_name,
            "player-tests"
        );
    }

    #[test]
    fn test_optional_maps_missing_entry() {
        assert_eq!(optional::<u8>(Err(keyring::Error::NoEntry)).unwrap(), None);
        assert_eq!(optional(Ok(3)).unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_round_trip_when_keyring_available() {
        // Headless CI machines usually have no keyring daemon
        let store = KeyringSecureStore::with_service_name("player-core-tests");
        let key = "lastfm_session_key_test";

        if let Err(e) = store.set_secret(key, b"session-value").await {
            println!("Keyring not available ({}), skipping test", e);
            return;
        }

        if let Ok(Some(value)) = store.get_secret(key).await {
            assert_eq!(value, b"session-value".to_vec());
        }
        store.delete_secret(key).await.unwrap();
        store.delete_secret(key).await.unwrap();
    }
}
