use anyhow::{Context, Result};
use popcorn_config::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// A value mirrored into a durable key/value store.
///
/// Reads the store once on creation and writes the JSON encoding back on
/// every change. Each change is exactly one write.
pub struct PersistedValue<T, S> {
    key: String,
    value: T,
    store: S,
}

impl<T, S> PersistedValue<T, S>
where
    T: Clone + Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Missing, unreadable or malformed stored data falls back to `initial`
    pub fn load(store: S, key: &str, initial: T) -> Self {
        let value = match store.read(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Loaded '{}' from durable store", key);
                    value
                }
                Err(e) => {
                    warn!("Stored value for '{}' is malformed ({}), using initial value", key, e);
                    initial
                }
            },
            Ok(None) => initial,
            Err(e) => {
                warn!("Failed to read '{}' from durable store ({}), using initial value", key, e);
                initial
            }
        };

        Self {
            key: key.to_string(),
            value,
            store,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// The in-memory value only changes once the store accepted the write
    pub fn set(&mut self, value: T) -> Result<()> {
        self.write(&value)?;
        self.value = value;
        Ok(())
    }

    /// Apply `f` to a copy, write it once, then keep it
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut next = self.value.clone();
        let result = f(&mut next);
        self.write(&next)?;
        self.value = next;
        Ok(result)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn write(&mut self, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode value for '{}'", self.key))?;
        self.store
            .write(&self.key, encoded)
            .with_context(|| format!("Failed to persist '{}'", self.key))
    }
}
