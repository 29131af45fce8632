use std::future::{pending, Future};
use std::time::Duration;

use kiln_store::{StoreError, StoreResult};
use tokio::sync::watch;
use tokio::time::Instant;

/// Deadline and cancellation for one inbound request.
///
/// Every store call made on behalf of the request runs under its context.
/// When the context is cancelled or its deadline passes, the in-flight call
/// is abandoned. Writes the store already committed stay committed.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancelled: Option<watch::Receiver<bool>>,
}

/// Cancels the [`RequestContext`] it was created with, and every clone of it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// A context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Tighten the deadline to at most `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tighten the deadline to at most `deadline`. An earlier existing
    /// deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attach a cancellation signal, returning the handle that fires it.
    pub fn with_cancellation(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancelled = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run a store call under this context.
    ///
    /// Returns [`StoreError::Cancelled`] or [`StoreError::Timeout`] if the
    /// context fires first; the call's future is dropped.
    pub async fn run<T, F>(&self, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(StoreError::Timeout);
        }

        tokio::select! {
            biased;
            _ = self.wait_cancelled() => Err(StoreError::Cancelled),
            _ = self.wait_deadline() => Err(StoreError::Timeout),
            result = call => result,
        }
    }

    async fn wait_cancelled(&self) {
        let Some(rx) = &self.cancelled else {
            return pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Handle dropped without cancelling.
            pending::<()>().await;
        }
    }

    async fn wait_deadline(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_context_runs_call() {
        let ctx = RequestContext::background();
        let value = ctx.run(async { Ok::<_, StoreError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_before_call() {
        let (ctx, handle) = RequestContext::background().with_cancellation();
        handle.cancel();
        let err = ctx.run(async { Ok::<_, StoreError>(()) }).await.unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_abandons_in_flight_call() {
        let (ctx, handle) = RequestContext::background().with_cancellation();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });
        let err = ctx.run(pending::<StoreResult<()>>()).await.unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
    }

    #[tokio::test]
    async fn deadline_times_out_call() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(10));
        let err = ctx.run(pending::<StoreResult<()>>()).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout));
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = RequestContext::background().with_cancellation();
        drop(handle);
        assert!(!ctx.is_cancelled());
        ctx.run(async { Ok::<_, StoreError>(()) }).await.unwrap();
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = RequestContext::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
