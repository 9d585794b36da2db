//! Task execution for handler invocations.

use crate::{Error, Result};
use futures::future::BoxFuture;
use std::fmt::Debug;
use tokio::runtime::Handle;

/// A unit of work: one guarded handler invocation
pub type Task = BoxFuture<'static, ()>;

/// Trait for anything that can run handler tasks concurrently.
///
/// `execute` must not wait for the task. Both emission modes go through
/// it, so an executor decides where handlers run but never when the caller
/// gets control back.
pub trait Executor: Send + Sync + Debug {
    /// Schedule a task to run independently of the caller
    fn execute(&self, task: Task) -> Result<()>;
}

/// Runs each task as its own Tokio task.
///
/// Without an explicit handle, tasks go to the runtime the caller is
/// running in.
#[derive(Debug, Clone, Default)]
pub struct TokioExecutor {
    handle: Option<Handle>,
}

impl TokioExecutor {
    /// Spawn onto the caller's runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto a specific runtime
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) -> Result<()> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?,
        };

        // Detached: completion is tracked by the task itself, not the handle.
        drop(handle.spawn(task));
        Ok(())
    }
}
