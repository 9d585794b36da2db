//! The event dispatcher.
//!
//! The [`Dispatcher`] owns the handler registry and runs matching handlers
//! for each emission, either fire-and-forget ([`Dispatcher::emit`]) or
//! behind a completion barrier ([`Dispatcher::emit_sync`]).

use crate::handler::{EventHandler, FunctionHandler};
use crate::registry::{decompose, HandlerEntry, HandlerRegistry};
use crate::{Event, EventId, Value};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, Dispatch};

pub mod boundary;
pub mod builder;
pub mod config;
pub mod executor;

pub use boundary::{HandlerOutcome, HandlerPanic};
pub use builder::DispatcherBuilder;
pub use config::DispatcherConfig;
pub use executor::{Executor, Task, TokioExecutor};

#[derive(Debug, Default)]
struct Counters {
    events_emitted: AtomicU64,
    events_unmatched: AtomicU64,
    handlers_scheduled: AtomicU64,
    handlers_completed: AtomicU64,
    handler_panics: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &HandlerOutcome) {
        match outcome {
            HandlerOutcome::Completed => self.handlers_completed.fetch_add(1, Ordering::Relaxed),
            HandlerOutcome::Panicked(_) => self.handler_panics.fetch_add(1, Ordering::Relaxed),
        };
    }
}

struct Inner {
    config: DispatcherConfig,
    registry: Arc<dyn HandlerRegistry>,
    executor: Arc<dyn Executor>,
    logger: Dispatch,
    counters: Arc<Counters>,
}

/// In-process publish/subscribe dispatcher.
///
/// Cloning is cheap and every clone shares the same registry, so handlers
/// can hold a clone to register more handlers or emit follow-up events.
///
/// # Example
///
/// ```rust,no_run
/// use tokio_dispatch::{Dispatcher, Value};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() {
///     let dispatcher = Dispatcher::with_current_logger();
///
///     dispatcher.on("user.*", |_ctx, event| async move {
///         println!("{} -> {:?}", event.signature(), event.payload());
///     });
///
///     let ctx = CancellationToken::new();
///     dispatcher.emit_sync(&ctx, "user.created", Value::new("ada".to_string())).await;
/// }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher with default configuration logging to `logger`
    pub fn new(logger: Dispatch) -> Self {
        DispatcherBuilder::new(logger).build()
    }

    /// Create a dispatcher logging to the current default subscriber
    pub fn with_current_logger() -> Self {
        Self::new(tracing::dispatcher::get_default(Dispatch::clone))
    }

    /// Create a new Dispatcher builder
    pub fn builder(logger: Dispatch) -> DispatcherBuilder {
        DispatcherBuilder::new(logger)
    }

    fn log<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.inner.logger, f)
    }

    /// Register a closure for every signature matching `pattern`
    pub fn on<F, Fut>(&self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_handler(pattern, FunctionHandler::new(handler));
    }

    /// Register a handler for every signature matching `pattern`.
    ///
    /// Registering under an existing pattern adds to its handlers. There is
    /// no way to remove a handler.
    pub fn on_handler<H: EventHandler>(&self, pattern: impl Into<String>, handler: H) {
        let pattern = pattern.into();
        let entry = HandlerEntry::new(pattern.as_str(), Arc::new(handler));
        let handler_name = entry.name().to_string();

        self.log(|| {
            self.inner.registry.register(entry);

            if self.inner.config.log_registrations {
                let (source, kind) = decompose(&pattern);
                info!(
                    pattern = %pattern,
                    source = %source,
                    event_type = %kind,
                    handler = %handler_name,
                    "Registered event handler"
                );
            }
        });
    }

    /// Emit an event without waiting for its handlers.
    ///
    /// Each matching handler is scheduled as its own task and this returns
    /// as soon as they are scheduled. Must be called from within a Tokio
    /// runtime unless the dispatcher was built with an explicit executor.
    pub fn emit(
        &self,
        ctx: &CancellationToken,
        signature: impl Into<String>,
        payload: Value,
    ) -> EventId {
        let (event, entries) = self.resolve(signature.into(), payload);

        for entry in entries {
            self.launch(entry, ctx.clone(), event.clone(), None);
        }

        event.id()
    }

    /// Emit an event and wait until every matching handler has returned.
    ///
    /// Handlers still run concurrently and in no particular order. A
    /// handler that panics counts as returned. A handler that ignores `ctx`
    /// is waited for regardless.
    pub async fn emit_sync(
        &self,
        ctx: &CancellationToken,
        signature: impl Into<String>,
        payload: Value,
    ) -> EventId {
        let (event, entries) = self.resolve(signature.into(), payload);
        if entries.is_empty() {
            return event.id();
        }

        // Each task holds a sender; the channel closes once all are dropped.
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        for entry in entries {
            self.launch(entry, ctx.clone(), event.clone(), Some(done_tx.clone()));
        }
        drop(done_tx);

        while done_rx.recv().await.is_some() {}

        event.id()
    }

    /// Build the event and snapshot its handlers. The registry lock is
    /// released before this returns.
    fn resolve(&self, signature: String, payload: Value) -> (Arc<Event>, Vec<HandlerEntry>) {
        let event = Arc::new(Event::new(signature, payload));
        let counters = &self.inner.counters;
        counters.events_emitted.fetch_add(1, Ordering::Relaxed);

        let entries = self.inner.registry.snapshot_matches(event.signature());

        if entries.is_empty() {
            counters.events_unmatched.fetch_add(1, Ordering::Relaxed);
            if self.inner.config.log_unmatched {
                self.log(|| {
                    debug!(
                        event_id = %event.id(),
                        signature = %event.signature(),
                        "No handlers matched event"
                    )
                });
            }
        } else if self.inner.config.debug_mode {
            self.log(|| {
                debug!(
                    event_id = %event.id(),
                    signature = %event.signature(),
                    handler_count = entries.len(),
                    "Dispatching event"
                )
            });
        }

        (event, entries)
    }

    /// Schedule one guarded handler invocation. Shared by both emission modes.
    fn launch(
        &self,
        entry: HandlerEntry,
        ctx: CancellationToken,
        event: Arc<Event>,
        done: Option<mpsc::Sender<()>>,
    ) {
        let counters = self.inner.counters.clone();
        let debug_mode = self.inner.config.debug_mode;
        let event_id = event.id();
        let handler_name = entry.name().to_string();

        let task = {
            let handler_name = handler_name.clone();
            async move {
                let _done = done;

                if debug_mode {
                    debug!(event_id = %event_id, handler = %handler_name, "Running handler");
                }

                let outcome = boundary::run_guarded(entry, ctx, event).await;
                counters.record(&outcome);

                if debug_mode {
                    debug!(
                        event_id = %event_id,
                        handler = %handler_name,
                        panicked = outcome.is_panic(),
                        "Handler finished"
                    );
                }
            }
        }
        .with_subscriber(self.inner.logger.clone())
        .boxed();

        match self.inner.executor.execute(task) {
            Ok(()) => {
                self.inner
                    .counters
                    .handlers_scheduled
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.log(|| {
                error!(
                    event_id = %event_id,
                    handler = %handler_name,
                    error = %e,
                    "Failed to schedule event handler"
                )
            }),
        }
    }

    /// Number of registered handlers across all patterns
    pub fn handler_count(&self) -> usize {
        self.inner.registry.handler_count()
    }

    /// All distinct registered patterns
    pub fn patterns(&self) -> Vec<String> {
        self.inner.registry.patterns()
    }

    /// The active configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    /// The injected logger
    pub fn logger(&self) -> &Dispatch {
        &self.inner.logger
    }

    /// Get statistics about the dispatcher
    pub fn stats(&self) -> DispatcherStats {
        let counters = &self.inner.counters;
        DispatcherStats {
            events_emitted: counters.events_emitted.load(Ordering::Relaxed),
            events_unmatched: counters.events_unmatched.load(Ordering::Relaxed),
            handlers_scheduled: counters.handlers_scheduled.load(Ordering::Relaxed),
            handlers_completed: counters.handlers_completed.load(Ordering::Relaxed),
            handler_panics: counters.handler_panics.load(Ordering::Relaxed),
            registered_handlers: self.handler_count(),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .field("executor", &self.inner.executor)
            .finish()
    }
}

/// Statistics about the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Events created by `emit` or `emit_sync`
    pub events_emitted: u64,

    /// Emissions that matched no handler
    pub events_unmatched: u64,

    /// Handler invocations handed to the executor
    pub handlers_scheduled: u64,

    /// Handler invocations that returned normally
    pub handlers_completed: u64,

    /// Handler invocations that panicked
    pub handler_panics: u64,

    /// Handlers currently registered
    pub registered_handlers: usize,
}

impl fmt::Display for DispatcherStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dispatcher Stats: {} handlers, {} events emitted ({} unmatched), {} completed, {} panicked",
            self.registered_handlers,
            self.events_emitted,
            self.events_unmatched,
            self.handlers_completed,
            self.handler_panics
        )
    }
}
