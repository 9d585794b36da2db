//! Event handler traits and implementations.

use crate::Event;
use async_trait::async_trait;
use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Trait for callbacks the dispatcher runs for matching events.
///
/// The token is the one passed to `emit`/`emit_sync`. The dispatcher never
/// cancels it or times a handler out; observing it is up to the handler.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Process an event
    async fn handle(&self, ctx: CancellationToken, event: Arc<Event>);

    /// Get the handler name for debugging
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// A closure-based event handler.
pub struct FunctionHandler<F, Fut>
where
    F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    function: F,
    name: String,
}

impl<F, Fut> FunctionHandler<F, Fut>
where
    F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Create a new function handler
    pub fn new(function: F) -> Self {
        Self::with_name(function, "FunctionHandler")
    }

    /// Create a new function handler with a custom name
    pub fn with_name(function: F, name: impl Into<String>) -> Self {
        Self {
            function,
            name: name.into(),
        }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FunctionHandler<F, Fut>
where
    F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, ctx: CancellationToken, event: Arc<Event>) {
        (self.function)(ctx, event).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F, Fut> fmt::Debug for FunctionHandler<F, Fut>
where
    F: Fn(CancellationToken, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionHandler")
            .field("name", &self.name)
            .finish()
    }
}

/// A handler that only runs for payloads of type `T`.
///
/// Events carrying anything else, including no payload, are skipped
/// without logging or error. Built with [`handle_payload`].
pub struct PayloadHandler<T, F, Fut>
where
    T: Any + Clone + Send + Sync,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    function: F,
    name: String,
    _phantom: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T, F, Fut> EventHandler for PayloadHandler<T, F, Fut>
where
    T: Any + Clone + Send + Sync,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, ctx: CancellationToken, event: Arc<Event>) {
        let Some(payload) = event.payload().downcast_ref::<T>().cloned() else {
            return;
        };
        (self.function)(ctx, payload).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, F, Fut> fmt::Debug for PayloadHandler<T, F, Fut>
where
    T: Any + Clone + Send + Sync,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadHandler")
            .field("name", &self.name)
            .finish()
    }
}

/// Adapt a typed callback into an [`EventHandler`] that filters on payload type.
///
/// ```rust,no_run
/// use tokio_dispatch::{handle_payload, Dispatcher};
///
/// #[derive(Debug, Clone)]
/// struct UserCreated { email: String }
///
/// # fn demo(dispatcher: &Dispatcher) {
/// dispatcher.on_handler("user.created", handle_payload(|_ctx, user: UserCreated| async move {
///     println!("welcome {}", user.email);
/// }));
/// # }
/// ```
pub fn handle_payload<T, F, Fut>(function: F) -> PayloadHandler<T, F, Fut>
where
    T: Any + Clone + Send + Sync,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    PayloadHandler {
        function,
        name: format!("PayloadHandler<{}>", type_name::<T>()),
        _phantom: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Clone)]
    struct TestEvent {
        value: u64,
    }

    #[tokio::test]
    async fn test_function_handler() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = seen.clone();

        let handler = FunctionHandler::with_name(
            move |_ctx, event: Arc<Event>| {
                let seen = seen_clone.clone();
                async move {
                    if let Some(e) = event.payload().downcast_ref::<TestEvent>() {
                        seen.store(e.value, Ordering::SeqCst);
                    }
                }
            },
            "recorder",
        );
        assert_eq!(handler.name(), "recorder");

        let event = Arc::new(Event::new("test.event", Value::new(TestEvent { value: 42 })));
        handler.handle(CancellationToken::new(), event).await;
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[tokio::test]
    async fn test_payload_handler_filters() {
        let total = Arc::new(AtomicU64::new(0));
        let total_clone = total.clone();

        let handler = handle_payload(move |_ctx, event: TestEvent| {
            let total = total_clone.clone();
            async move {
                total.fetch_add(event.value, Ordering::SeqCst);
            }
        });
        assert!(handler.name().contains("TestEvent"));

        let ctx = CancellationToken::new();
        for payload in [
            Value::new(TestEvent { value: 5 }),
            Value::new("not a test event"),
            Value::nil(),
            Value::new(TestEvent { value: 7 }),
        ] {
            handler
                .handle(ctx.clone(), Arc::new(Event::new("test.event", payload)))
                .await;
        }

        assert_eq!(total.load(Ordering::SeqCst), 12);
    }
}
