//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the controller with mock implementations.

use crate::storage::SessionDb;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session-scoped key-value storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a slot; `Ok(None)` if it was never written
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Write a slot, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        (**self).set(key, value).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use `SessionDb` as a store for one session
#[derive(Clone)]
pub struct DatabaseStore {
    db: SessionDb,
    session_id: String,
}

impl DatabaseStore {
    pub fn new(db: SessionDb, session_id: impl Into<String>) -> Self {
        Self {
            db,
            session_id: session_id.into(),
        }
    }
}

#[async_trait]
impl SessionStore for DatabaseStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.db
            .get_slot(&self.session_id, key)
            .map_err(|e| e.to_string())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.db
            .set_slot(&self.session_id, key, value)
            .map_err(|e| e.to_string())
    }
}

/// Process-local store; everything is gone when it is dropped
#[derive(Default)]
pub struct InMemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot (e.g. to simulate a reload)
    #[must_use]
    pub fn with_slot(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.into(), value.into());
        }
        self
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let slots = self.slots.lock().map_err(|e| e.to_string())?;
        Ok(slots.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut slots = self.slots.lock().map_err(|e| e.to_string())?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
