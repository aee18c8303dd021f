//! # Request Context
//!
//! Deadline and cancellation carried into every driver call. Dropping the
//! in-flight future aborts the HTTP request; nothing is compensated on the
//! gateway side.

use crate::error::{PaymentError, PaymentResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Upper bound applied to any configured per-request timeout
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline and cancellation signal for a single operation
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] derived from [`Context::with_cancel`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may already be gone; that is fine.
        let _ = self.tx.send(true);
    }
}

impl Context {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Adds a cancellation signal to this context
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Earliest of the context deadline and `now + min(default, 30s)`
    pub fn effective_deadline(&self, default_timeout: Duration) -> Instant {
        let fallback = Instant::now() + default_timeout.min(MAX_REQUEST_TIMEOUT);
        match self.deadline {
            Some(d) if d < fallback => d,
            _ => fallback,
        }
    }

    /// Run `fut` under this context; expiry or cancellation yields `Timeout`
    pub async fn run<F, T>(&self, default_timeout: Duration, fut: F) -> PaymentResult<T>
    where
        F: Future<Output = PaymentResult<T>>,
    {
        if self.is_cancelled() {
            return Err(PaymentError::Timeout("context cancelled".to_string()));
        }
        let deadline = self.effective_deadline(default_timeout);
        let timed = tokio::time::timeout_at(deadline, fut);

        match self.cancel.clone() {
            Some(mut rx) => {
                tokio::select! {
                    res = timed => res.map_err(|_| deadline_exceeded())?,
                    _ = wait_cancelled(&mut rx) => {
                        Err(PaymentError::Timeout("context cancelled".to_string()))
                    }
                }
            }
            None => timed.await.map_err(|_| deadline_exceeded())?,
        }
    }
}

fn deadline_exceeded() -> PaymentError {
    PaymentError::Timeout("deadline exceeded".to_string())
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling: never fires.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_is_timeout() {
        let ctx = Context::with_timeout(Duration::from_millis(50));
        let res: PaymentResult<()> = ctx
            .run(Duration::from_secs(30), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(res, Err(PaymentError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_capped() {
        let ctx = Context::background();
        let now = Instant::now();
        let deadline = ctx.effective_deadline(Duration::from_secs(120));
        assert_eq!(deadline - now, MAX_REQUEST_TIMEOUT);

        let deadline = ctx.effective_deadline(Duration::from_secs(5));
        assert_eq!(deadline - now, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_context_deadline_wins() {
        let ctx = Context::with_timeout(Duration::from_secs(2));
        let now = Instant::now();
        assert_eq!(ctx.effective_deadline(Duration::from_secs(30)) - now, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let (ctx, handle) = Context::background().with_cancel();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move {
            task_ctx
                .run(Duration::from_secs(30), async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok::<_, PaymentError>(())
                })
                .await
        });
        tokio::task::yield_now().await;
        handle.cancel();
        let res = task.await.unwrap();
        assert!(matches!(res, Err(PaymentError::Timeout(_))));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let ctx = Context::background();
        let value = ctx.run(Duration::from_secs(1), async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
