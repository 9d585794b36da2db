//! Core event type.
//!
//! An [`Event`] is created by the dispatcher for every emission and shared
//! read-only with each matching handler. It is never stored or replayed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};

pub mod id;
pub mod value;

pub use id::EventId;
pub use value::{Value, ValueList, ValueMap};

/// An immutable, named occurrence.
///
/// # Example
///
/// ```rust
/// use tokio_dispatch::{Event, Value};
///
/// let event = Event::new("user.created", Value::new(42u64));
/// assert_eq!(event.signature(), "user.created");
/// assert!(event.id().to_string().starts_with("evt_"));
/// ```
#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    signature: String,
    payload: Value,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Create a new event with a fresh id and the current UTC time
    pub fn new(signature: impl Into<String>, payload: Value) -> Self {
        Self {
            id: EventId::next(),
            signature: signature.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Unique id of this event
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Dot-delimited signature, e.g. `user.created`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The untyped payload; see [`crate::payload`] for typed access
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Creation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Serialize to the JSON wire shape
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::serialization(e.to_string()))
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = self.payload.to_json().map_err(S::Error::custom)?;
        let fields = if payload.is_some() { 4 } else { 3 };

        let mut state = serializer.serialize_struct("Event", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("signature", &self.signature)?;
        match payload {
            Some(payload) => state.serialize_field("payload", &payload)?,
            None => state.skip_field("payload")?,
        }
        state.serialize_field(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )?;
        state.end()
    }
}
