//! Per-session parameter persistence
//!
//! `SessionStore` is the seam for whatever durable per-session storage the
//! host environment provides. `ParameterStore` sits on top of it and owns
//! the single well-known key holding the serialized attribution blob.
//!
//! Storage failing (disabled, quota exceeded) is a tolerated condition:
//! the rest of the pipeline keeps working from current-URL parameters only,
//! so every failure here is logged and swallowed.

use crate::params::TrackingParams;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Well-known session-storage key for the serialized attribution set
pub const ATTRIBUTION_KEY: &str = "funnel.attribution";

/// Durable per-session key-value storage.
///
/// Implementations must tolerate concurrent access from timer callbacks
/// and event handlers (single logical writer, interleaved callers).
pub trait SessionStore: Send + Sync {
    /// Read a value, `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, overwriting any prior value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory session store.
///
/// Stands in for browser sessionStorage: contents live exactly as long as
/// the process (session) does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("session store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("session store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable persistence for the tracking parameter set.
#[derive(Clone)]
pub struct ParameterStore {
    store: Arc<dyn SessionStore>,
}

impl ParameterStore {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Load the persisted parameter set.
    ///
    /// Returns an empty set when nothing was persisted yet, when storage is
    /// unavailable, or when the persisted blob fails to parse. None of those
    /// conditions ever propagate to the caller.
    pub fn load(&self) -> TrackingParams {
        let raw = match self.store.get(ATTRIBUTION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return TrackingParams::new(),
            Err(e) => {
                warn!("Session storage unavailable on load: {}", e);
                return TrackingParams::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(params) => params,
            Err(e) => {
                warn!("Discarding unparseable attribution blob: {}", e);
                TrackingParams::new()
            }
        }
    }

    /// Persist the given parameter set, overwriting any prior value.
    ///
    /// Best effort: storage failure is logged and swallowed.
    pub fn save(&self, params: &TrackingParams) {
        let raw = match serde_json::to_string(params) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize attribution set: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(ATTRIBUTION_KEY, &raw) {
            warn!("Session storage unavailable on save: {}", e);
        }
    }
}
