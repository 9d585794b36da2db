//! Handler registry mapping patterns to handlers.
//!
//! The registry is the dispatcher's only shared mutable state. Writers
//! append handlers under a pattern; readers resolve the handlers whose
//! pattern matches a concrete signature.

use crate::handler::EventHandler;
use std::fmt::{self, Debug};
use std::sync::Arc;

pub mod pattern;
mod rwlock;

pub use pattern::{decompose, matches, WILDCARD};
pub use rwlock::RwLockRegistry;

/// A handler registered under a pattern
#[derive(Clone)]
pub struct HandlerEntry {
    /// Pattern the handler was registered with
    pub pattern: Arc<str>,

    /// The handler itself
    pub handler: Arc<dyn EventHandler>,
}

impl HandlerEntry {
    /// Create a new entry
    pub fn new(pattern: impl Into<Arc<str>>, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            pattern: pattern.into(),
            handler,
        }
    }

    /// Name of the wrapped handler
    pub fn name(&self) -> &str {
        self.handler.name()
    }
}

impl Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Trait for registries that map patterns to handlers.
///
/// Implementations must be thread-safe. `snapshot_matches` must return a
/// consistent view: it never observes a half-applied `register`.
pub trait HandlerRegistry: Send + Sync + Debug {
    /// Append a handler to the list for `entry.pattern`.
    ///
    /// Never deduplicates; registering the same pattern again accumulates.
    fn register(&self, entry: HandlerEntry);

    /// Collect every handler whose pattern matches `signature`.
    ///
    /// Handlers under one pattern keep their registration order. No order is
    /// promised across patterns.
    fn snapshot_matches(&self, signature: &str) -> Vec<HandlerEntry>;

    /// Total number of registered handlers
    fn handler_count(&self) -> usize;

    /// All distinct registered patterns
    fn patterns(&self) -> Vec<String>;
}
