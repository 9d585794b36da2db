//! Process-wide event identifiers.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier assigned to every [`Event`](crate::Event) at construction.
///
/// Ids come from a single atomic counter that lives as long as the process.
/// They are never reset or reused, and render as `evt_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    /// Allocate the next id from the process-wide counter
    pub fn next() -> Self {
        Self(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The raw counter value
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt_{}", self.0)
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let first = EventId::next();
        let second = EventId::next();
        assert!(second > first);
        assert_ne!(first.sequence(), 0);
    }

    #[test]
    fn test_id_format() {
        let id = EventId::next();
        assert_eq!(id.to_string(), format!("evt_{}", id.sequence()));
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| EventId::next()).collect::<Vec<_>>()))
            .collect();

        let mut ids: Vec<EventId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 1000);
    }
}
