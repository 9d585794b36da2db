//! # tokio-dispatch
//!
//! In-process publish/subscribe event dispatch for Tokio applications.
//!
//! ## Features
//!
//! - **Wildcard patterns**: `user.*`, `*.created`, or `*` for everything
//! - **Two emission modes**: fire-and-forget `emit`, or `emit_sync` that
//!   waits for every matching handler
//! - **Panic isolation**: a failing handler is logged and never takes down
//!   the caller or its siblings
//! - **Typed payloads**: recover concrete types from untyped payloads with
//!   clear errors instead of crashes
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use tokio_dispatch::{handle_payload, payload, Dispatcher, Value};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Clone)]
//! struct UserRegistered {
//!     user_id: u64,
//!     email: String,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::with_current_logger();
//!
//!     // Typed subscriber: ignores payloads of other types
//!     dispatcher.on_handler(
//!         "user.registered",
//!         handle_payload(|_ctx, user: UserRegistered| async move {
//!             println!("welcome {}", user.email);
//!         }),
//!     );
//!
//!     // Wildcard subscriber with explicit extraction
//!     dispatcher.on("user.*", |_ctx, event| async move {
//!         match payload::payload_as::<UserRegistered>(&event) {
//!             Ok(user) => println!("audit: user {}", user.user_id),
//!             Err(e) => println!("audit: {} ({})", event.signature(), e),
//!         }
//!     });
//!
//!     let ctx = CancellationToken::new();
//!     dispatcher
//!         .emit_sync(
//!             &ctx,
//!             "user.registered",
//!             Value::new(UserRegistered {
//!                 user_id: 123,
//!                 email: "user@example.com".to_string(),
//!             }),
//!         )
//!         .await;
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Core event type and payload values
pub mod event;

/// Error types and result aliases
pub mod error;

/// Pattern registry for handler lookup
pub mod registry;

/// Event handler traits and adapters
pub mod handler;

/// Typed payload extraction
pub mod payload;

/// The event dispatcher
pub mod dispatcher;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherStats};
pub use error::{Error, Result};
pub use event::{Event, EventId, Value, ValueList, ValueMap};
pub use handler::{handle_payload, EventHandler};
pub use payload::{
    is_payload_type, must_payload_as, payload_as, payload_as_map, payload_as_slice,
    payload_map_as, payload_slice_as,
};

/// Prelude module for convenient imports
///
/// # Example
/// ```rust
/// use tokio_dispatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dispatcher::{Dispatcher, DispatcherConfig};
    pub use crate::error::{Error, Result};
    pub use crate::event::{Event, Value, ValueList, ValueMap};
    pub use crate::handler::{handle_payload, EventHandler};
    pub use crate::payload::*;
    pub use tokio_util::sync::CancellationToken;
}
