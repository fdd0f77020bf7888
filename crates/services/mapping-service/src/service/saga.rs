//! Compensating multi-step writes.
//!
//! The user and request tables are written independently, so a workflow
//! that touches both runs as a saga: each forward step registers an undo
//! action, and the first failing step unwinds the completed ones in reverse.
//! Every compensation gets exactly one attempt. If any compensation fails the
//! caller receives a data integrity error describing the partial write.

use futures::future::BoxFuture;
use std::future::Future;

use common::{AppError, AppResult};

/// Boxed undo action of one completed step
pub type Compensation<'a> = Box<dyn FnOnce() -> BoxFuture<'a, AppResult<()>> + Send + 'a>;

/// A running saga
pub struct Saga<'a> {
    name: &'static str,
    completed: Vec<(&'static str, Compensation<'a>)>,
}

impl<'a> Saga<'a> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Run a forward step. On success `compensate` is registered; on failure
    /// every completed step is compensated and the error returned.
    pub async fn step<F, C>(&mut self, label: &'static str, forward: F, compensate: C) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>> + Send,
        C: FnOnce() -> BoxFuture<'a, AppResult<()>> + Send + 'a,
    {
        match forward.await {
            Ok(()) => {
                self.completed.push((label, Box::new(compensate)));
                Ok(())
            }
            Err(err) => Err(self.unwind(label, err).await),
        }
    }

    /// Run a final step with nothing to undo and return its output.
    pub async fn finish<F, T>(mut self, label: &'static str, forward: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        match forward.await {
            Ok(output) => Ok(output),
            Err(err) => Err(self.unwind(label, err).await),
        }
    }

    async fn unwind(&mut self, failed: &'static str, cause: AppError) -> AppError {
        tracing::warn!(saga = self.name, step = failed, error = %cause, "Saga step failed, compensating");

        let mut stranded = Vec::new();
        while let Some((label, compensate)) = self.completed.pop() {
            if let Err(err) = compensate().await {
                tracing::error!(saga = self.name, step = label, error = %err, "Compensation failed");
                stranded.push(label);
            }
        }

        if stranded.is_empty() {
            cause
        } else {
            AppError::integrity(format!(
                "{}: step '{}' failed ({}) and compensation of [{}] failed",
                self.name,
                failed,
                cause,
                stranded.join(", ")
            ))
        }
    }
}
