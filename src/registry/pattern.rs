//! Signature pattern matching.
//!
//! Patterns share the dot-delimited shape of signatures. A `*` segment
//! matches any single segment, and the whole pattern `*` matches every
//! signature regardless of its segment count.

/// The wildcard token
pub const WILDCARD: &str = "*";

/// Test whether `pattern` selects `signature`.
///
/// ```rust
/// use tokio_dispatch::registry::matches;
///
/// assert!(matches("user.*", "user.created"));
/// assert!(!matches("user.*", "order.created"));
/// assert!(!matches("*.created", "user.profile.created"));
/// assert!(matches("*", "anything.at.all"));
/// ```
pub fn matches(pattern: &str, signature: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }

    let mut pattern_segments = pattern.split('.');
    let mut signature_segments = signature.split('.');

    loop {
        match (pattern_segments.next(), signature_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) => {
                if p != WILDCARD && p != s {
                    return false;
                }
            }
            // Segment counts differ
            _ => return false,
        }
    }
}

/// Split a pattern into its first segment (source) and the remainder (type).
///
/// Used for registration logging only.
pub fn decompose(pattern: &str) -> (&str, &str) {
    pattern.split_once('.').unwrap_or((pattern, ""))
}
