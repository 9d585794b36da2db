//! Per-handler failure boundary.
//!
//! Every handler invocation, in either emission mode, runs through
//! [`run_guarded`]. A panic inside the handler is caught, logged against
//! the event, and turned into a [`HandlerOutcome`] instead of unwinding
//! into the executor.

use crate::registry::HandlerEntry;
use crate::{Event, EventId};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Details of a handler that panicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPanic {
    /// Event being handled
    pub event_id: EventId,
    /// Signature of that event
    pub signature: String,
    /// Pattern the handler was registered under
    pub pattern: String,
    /// Handler name
    pub handler: String,
    /// Panic message, when it was a string
    pub message: String,
}

impl fmt::Display for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler '{}' ({}) panicked on {} [{}]: {}",
            self.handler, self.pattern, self.event_id, self.signature, self.message
        )
    }
}

/// How a guarded handler invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler returned normally
    Completed,
    /// The handler panicked; the panic was contained
    Panicked(HandlerPanic),
}

impl HandlerOutcome {
    /// Whether the handler panicked
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerOutcome::Panicked(_))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run one handler, containing any panic it raises
pub(crate) async fn run_guarded(
    entry: HandlerEntry,
    ctx: CancellationToken,
    event: Arc<Event>,
) -> HandlerOutcome {
    let result = AssertUnwindSafe(entry.handler.handle(ctx, event.clone()))
        .catch_unwind()
        .await;

    match result {
        Ok(()) => HandlerOutcome::Completed,
        Err(panic) => {
            let failure = HandlerPanic {
                event_id: event.id(),
                signature: event.signature().to_string(),
                pattern: entry.pattern.to_string(),
                handler: entry.name().to_string(),
                message: panic_message(&*panic),
            };

            error!(
                event_id = %failure.event_id,
                signature = %failure.signature,
                pattern = %failure.pattern,
                handler = %failure.handler,
                panic = %failure.message,
                "Event handler panicked"
            );

            HandlerOutcome::Panicked(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FunctionHandler;
    use crate::Value;

    fn entry<F, Fut>(f: F) -> HandlerEntry
    where
        F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        HandlerEntry::new("job.*", Arc::new(FunctionHandler::with_name(f, "worker")))
    }

    #[tokio::test]
    async fn test_completed() {
        let event = Arc::new(Event::new("job.done", Value::nil()));
        let outcome = run_guarded(entry(|_, _| async {}), CancellationToken::new(), event).await;
        assert_eq!(outcome, HandlerOutcome::Completed);
        assert!(!outcome.is_panic());
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let event = Arc::new(Event::new("job.failed", Value::nil()));
        let id = event.id();

        let outcome = run_guarded(
            entry(|_, _| async { panic!("boom"); }),
            CancellationToken::new(),
            event,
        )
        .await;

        match outcome {
            HandlerOutcome::Panicked(failure) => {
                assert_eq!(failure.event_id, id);
                assert_eq!(failure.signature, "job.failed");
                assert_eq!(failure.pattern, "job.*");
                assert_eq!(failure.handler, "worker");
                assert_eq!(failure.message, "boom");
                assert!(failure.to_string().contains("boom"));
            }
            other => panic!("expected panic outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let event = Arc::new(Event::new("job.failed", Value::nil()));
        let outcome = run_guarded(
            entry(|_, event: Arc<Event>| async move {
                panic!("bad event {}", event.signature());
            }),
            CancellationToken::new(),
            event,
        )
        .await;

        let HandlerOutcome::Panicked(failure) = outcome else {
            panic!("expected panic outcome");
        };
        assert_eq!(failure.message, "bad event job.failed");
    }

    #[test]
    fn test_non_string_panic_payload() {
        assert_eq!(panic_message(&42u32), "non-string panic payload");
        assert_eq!(panic_message(&"plain"), "plain");
    }
}
