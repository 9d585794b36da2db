//! Error types for the tokio-dispatch library.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tokio-dispatch
///
/// Most variants come from the payload extraction functions in
/// [`crate::payload`]. Their messages are stable and safe to match on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The event carries no payload
    #[error("payload is nil")]
    NilPayload,

    /// The payload's concrete type is not the requested one
    #[error("invalid payload type: expected {expected}, found {found}")]
    InvalidPayloadType {
        /// Requested type
        expected: &'static str,
        /// Concrete type carried by the event
        found: &'static str,
    },

    /// The payload is not a keyed mapping
    #[error("payload is not a map")]
    NotAMap,

    /// The payload is not an ordered sequence
    #[error("payload is not a slice")]
    NotASlice,

    /// A mapping value has the wrong type
    #[error("invalid type for key \"{key}\": expected {expected}, found {found}")]
    InvalidKeyType {
        /// Offending key
        key: String,
        /// Requested element type
        expected: &'static str,
        /// Concrete type stored under the key
        found: &'static str,
    },

    /// A sequence element has the wrong type
    #[error("invalid type at index {index}: expected {expected}, found {found}")]
    InvalidIndexType {
        /// Position in the original sequence
        index: usize,
        /// Requested element type
        expected: &'static str,
        /// Concrete type stored at the index
        found: &'static str,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No Tokio runtime was available to run a handler
    #[error("No runtime available: {0}")]
    NoRuntime(String),
}

impl Error {
    /// Create a new serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Error::Serialization(msg.into())
    }

    /// Check if this error reports an absent payload
    pub fn is_nil_payload(&self) -> bool {
        matches!(self, Error::NilPayload)
    }

    /// Check if this error reports a payload or element of the wrong type
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            Error::InvalidPayloadType { .. }
                | Error::InvalidKeyType { .. }
                | Error::InvalidIndexType { .. }
        )
    }
}
