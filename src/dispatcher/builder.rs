//! Builder pattern for constructing Dispatcher instances.

use super::{Counters, Dispatcher, DispatcherConfig, Executor, Inner, TokioExecutor};
use crate::registry::{HandlerRegistry, RwLockRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, Dispatch};

/// Builder for creating Dispatcher instances.
///
/// The logger is the one mandatory dependency, so it is taken up front.
pub struct DispatcherBuilder {
    logger: Dispatch,
    config: DispatcherConfig,
    registry: Option<Arc<dyn HandlerRegistry>>,
    executor: Option<Arc<dyn Executor>>,
}

impl DispatcherBuilder {
    /// Create a new builder with default configuration
    pub fn new(logger: Dispatch) -> Self {
        Self {
            logger,
            config: DispatcherConfig::default(),
            registry: None,
            executor: None,
        }
    }

    /// Use a custom configuration
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the dispatcher
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatcherConfig) -> DispatcherConfig,
    {
        self.config = f(self.config);
        self
    }

    /// Use a custom registry implementation
    pub fn registry(mut self, registry: Arc<dyn HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom executor implementation
    pub fn executor<E>(mut self, executor: E) -> Self
    where
        E: Executor + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Build with the quiet logging preset
    pub fn quiet(self) -> Self {
        self.config(DispatcherConfig::quiet())
    }

    /// Build with the verbose logging preset
    pub fn verbose(self) -> Self {
        self.config(DispatcherConfig::verbose())
    }

    /// Build the Dispatcher
    pub fn build(self) -> Dispatcher {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(RwLockRegistry::with_capacity(64)));
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(TokioExecutor::new()));

        tracing::dispatcher::with_default(&self.logger, || {
            debug!(config = ?self.config, "Dispatcher built");
        });

        Dispatcher {
            inner: Arc::new(Inner {
                config: self.config,
                registry,
                executor,
                logger: self.logger,
                counters: Arc::new(Counters::default()),
            }),
        }
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("executor", &self.executor)
            .finish()
    }
}
