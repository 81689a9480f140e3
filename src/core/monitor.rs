//! Operation monitor
//!
//! Every mutating call returns an operation handle. The knowledge base is
//! only updated once that operation reaches `Succeeded`, so callers drive
//! it here: wait, poll, repeat until terminal or out of attempts.
//!
//! ```text
//! NotStarted/Running --poll--> NotStarted/Running | Succeeded | Failed
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{QnaError, Result};
use crate::remote::{OperationHandle, OperationState, QnaBackend};

/// Default wait between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default poll budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Receiving side of a cancellation request
///
/// The monitor checks it between polls, so a status request already in flight
/// completes. Other work is abandoned through [`CancelSignal::guard`].
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

/// Sending side of a cancellation request
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn channel() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx: Some(rx) })
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Run `work` unless cancellation is requested first
    ///
    /// `work` is polled before the signal, so an operation wait inside it
    /// still reports its own `Cancelled { operation_id }`.
    pub async fn guard<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        let mut cancel = self.clone();
        tokio::select! {
            biased;
            result = work => result,
            _ = cancel.cancelled() => {
                warn!("interrupted");
                Err(QnaError::Interrupted)
            }
        }
    }

    /// Resolves once cancellation is requested
    async fn cancelled(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Sender gone, nobody can cancel any more
                    break;
                }
            }
        }
        std::future::pending::<()>().await
    }
}

/// Polls operations until they finish
#[derive(Debug, Clone, Copy)]
pub struct OperationMonitor {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for OperationMonitor {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl OperationMonitor {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Drive `handle` to a terminal state
    ///
    /// Returns the final handle on `Succeeded`. A `Failed` operation, or one
    /// still pending after `max_attempts` polls, is an
    /// `OperationTimedOutOrFailed` error.
    pub async fn monitor<B: QnaBackend + ?Sized>(
        &self,
        backend: &B,
        handle: OperationHandle,
        cancel: &CancelSignal,
    ) -> Result<OperationHandle> {
        let mut cancel = cancel.clone();
        let mut handle = handle;
        let mut attempts = 0u32;

        while handle.state.is_pending() && attempts < self.max_attempts {
            attempts += 1;
            info!(
                operation_id = %handle.operation_id,
                attempt = attempts,
                state = %handle.state,
                "waiting for operation to complete"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(operation_id = %handle.operation_id, "operation wait cancelled");
                    return Err(QnaError::Cancelled {
                        operation_id: handle.operation_id,
                    });
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            handle = backend.get_operation_status(&handle.operation_id).await?;
        }

        if handle.state != OperationState::Succeeded {
            return Err(QnaError::OperationTimedOutOrFailed {
                operation_id: handle.operation_id,
                state: handle.state,
                detail: handle.error_detail,
            });
        }

        info!(operation_id = %handle.operation_id, polls = attempts, "operation succeeded");
        Ok(handle)
    }
}
