//! RwLock-backed implementation of HandlerRegistry.

use super::{matches, HandlerEntry, HandlerRegistry};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// The default registry.
///
/// A single read/write lock guards the whole pattern map, so a snapshot is
/// taken against one consistent state and registrations are serialized.
/// The lock is only held while copying out handler references, never while
/// a handler runs.
#[derive(Debug, Default)]
pub struct RwLockRegistry {
    entries: RwLock<HashMap<String, Vec<HandlerEntry>>>,
}

impl RwLockRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with pre-allocated capacity for `patterns` patterns
    pub fn with_capacity(patterns: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(patterns)),
        }
    }
}

impl HandlerRegistry for RwLockRegistry {
    fn register(&self, entry: HandlerEntry) {
        trace!(pattern = %entry.pattern, handler = entry.name(), "Registering handler");

        // Nothing panics while the lock is held, so a poisoned lock still
        // guards a valid map.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(entry.pattern.to_string())
            .or_default()
            .push(entry);
    }

    fn snapshot_matches(&self, signature: &str) -> Vec<HandlerEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter(|(pattern, _)| matches(pattern, signature))
            .flat_map(|(_, handlers)| handlers.iter().cloned())
            .collect()
    }

    fn handler_count(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(Vec::len).sum()
    }

    fn patterns(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.keys().cloned().collect()
    }
}
