//! Configuration for the dispatcher.

use crate::{Error, Result};
use serde::Deserialize;

/// Configuration for the dispatcher.
///
/// Only logging behavior is configurable; matching and delivery semantics
/// are fixed. The struct deserializes with every field optional so it can
/// be embedded in a host application's own configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Log each registration with its pattern decomposition
    pub log_registrations: bool,

    /// Log emissions that matched no handler
    pub log_unmatched: bool,

    /// Log every handler start and finish
    pub debug_mode: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            log_registrations: true,
            log_unmatched: true,
            debug_mode: false,
        }
    }
}

impl DispatcherConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON, defaulting missing fields
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Enable registration notices
    pub fn log_registrations(mut self, enable: bool) -> Self {
        self.log_registrations = enable;
        self
    }

    /// Enable "no handlers matched" notices
    pub fn log_unmatched(mut self, enable: bool) -> Self {
        self.log_unmatched = enable;
        self
    }

    /// Enable per-handler tracing
    pub fn debug_mode(mut self, enable: bool) -> Self {
        self.debug_mode = enable;
        self
    }
}

/// Preset configurations for common use cases
impl DispatcherConfig {
    /// Only handler failures are logged
    pub fn quiet() -> Self {
        Self::default()
            .log_registrations(false)
            .log_unmatched(false)
            .debug_mode(false)
    }

    /// Everything is logged
    pub fn verbose() -> Self {
        Self::default()
            .log_registrations(true)
            .log_unmatched(true)
            .debug_mode(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::new();
        assert!(config.log_registrations);
        assert!(config.log_unmatched);
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_presets() {
        let quiet = DispatcherConfig::quiet();
        assert!(!quiet.log_registrations && !quiet.log_unmatched && !quiet.debug_mode);

        let verbose = DispatcherConfig::verbose();
        assert!(verbose.log_registrations && verbose.log_unmatched && verbose.debug_mode);
    }

    #[test]
    fn test_from_json() {
        let config = DispatcherConfig::from_json(r#"{ "debug_mode": true }"#).unwrap();
        assert!(config.debug_mode);
        assert!(config.log_registrations);

        assert_eq!(DispatcherConfig::from_json("{}").unwrap(), DispatcherConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let err = DispatcherConfig::from_json(r#"{ "debug_mode": "yes" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
