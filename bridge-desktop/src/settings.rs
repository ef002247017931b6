//! Settings Storage using a JSON document

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// JSON-file settings store implementation
///
/// Keeps every setting in a single JSON object and rewrites the whole file
/// after each change. The player stores a few dozen small values (sort
/// orders, selections, toggles), so a flat document is enough.
///
/// Values keep their JSON type; reading a key with the wrong typed getter is
/// an error, as with any typed settings backend.
pub struct JsonSettingsStore {
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
}

impl JsonSettingsStore {
    /// Open (or create) a settings file at the given path
    ///
    /// A file that cannot be parsed is logged and replaced on the next write
    /// instead of blocking startup.
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(BridgeError::Io)?;
            }
        }

        let values = match tokio::fs::read(&path).await {
            Ok(data) => match serde_json::from_slice::<Value>(&data) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!(path = ?path, "Settings file is not a JSON object, starting empty");
                    Map::new()
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Settings file is corrupt, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        debug!(path = ?path, keys = values.len(), "Initialized settings store");

        Ok(Self {
            path: Some(path),
            values: Mutex::new(values),
        })
    }

    /// Create an in-memory settings store (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(Map::new()),
        }
    }

    async fn persist(&self, values: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = serde_json::to_vec_pretty(values).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to serialize settings: {}", e))
        })?;

        // Write to a sibling file first so a crash never leaves half a document
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await.map_err(BridgeError::Io)?;
        tokio::fs::rename(&tmp, path).await.map_err(BridgeError::Io)?;
        Ok(())
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().await;
        let value_type = type_name(&value);
        values.insert(key.to_string(), value);
        self.persist(&values).await?;

        debug!(key = key, value_type = value_type, "Stored setting");
        Ok(())
    }

    async fn get_value<T>(
        &self,
        key: &str,
        expected_type: &str,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        let values = self.values.lock().await;
        match values.get(key) {
            Some(value) => match convert(value) {
                Some(converted) => Ok(Some(converted)),
                None => {
                    error!(
                        key = key,
                        expected = expected_type,
                        actual = type_name(value),
                        "Type mismatch"
                    );
                    Err(BridgeError::OperationFailed(format!(
                        "Type mismatch: expected {}, got {}",
                        expected_type,
                        type_name(value)
                    )))
                }
            },
            None => Ok(None),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "i64",
        Value::Number(_) => "f64",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, Value::String(value.to_string())).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key, "string", |v| v.as_str().map(str::to_string))
            .await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, Value::Bool(value)).await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_value(key, "bool", Value::as_bool).await
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_value(key, Value::from(value)).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get_value(key, "i64", Value::as_i64).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
            debug!(key = key, "Deleted setting");
        }
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().await.contains_key(key))
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.values.lock().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut values = self.values.lock().await;
        values.clear();
        self.persist(&values).await?;

        debug!("Cleared all settings");
        Ok(())
    }
}
