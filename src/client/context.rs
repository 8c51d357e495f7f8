//! Request Context
//!
//! Cancellation and deadline carried through a single client call.

use crate::error::{ApiError, CancelReason, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation signal plus an optional deadline for one logical operation
///
/// Cloning shares the underlying token, so cancelling any clone cancels all.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Wrap an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Bound the operation to `timeout` from now (an earlier deadline is kept)
    ///
    /// A timeout too large to represent leaves the deadline unchanged.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Bound the operation to an absolute deadline (an earlier deadline is kept)
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// The underlying cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(ApiError::Cancelled(CancelReason::Cancelled));
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                Err(ApiError::Cancelled(CancelReason::DeadlineExceeded))
            }
            _ => Ok(()),
        }
    }

    /// Resolves once the token fires or the deadline passes
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => CancelReason::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            reason = self.done() => Err(ApiError::Cancelled(reason)),
            out = fut => Ok(out),
        }
    }

    /// Sleep for `duration`, returning early with `Cancelled` if the context finishes
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(tokio::time::sleep(duration)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_background_never_fires() {
        let ctx = RequestContext::background();
        assert_ok!(ctx.check());
        assert_ok!(ctx.sleep(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let ctx = RequestContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let err = ctx.sleep(Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled(CancelReason::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_deadline_interrupts_sleep() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
        let err = ctx.sleep(Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Cancelled(CancelReason::DeadlineExceeded)
        ));
        assert_err!(ctx.check());
    }

    #[tokio::test]
    async fn test_earlier_deadline_wins() {
        let ctx = RequestContext::background()
            .with_timeout(Duration::from_millis(100))
            .with_timeout(Duration::from_secs(60));
        let deadline = ctx.deadline().unwrap();
        assert!(deadline <= Instant::now() + Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_unbounded_timeout_keeps_deadline() {
        let ctx = RequestContext::background().with_timeout(Duration::MAX);
        assert_eq!(ctx.deadline(), None);
        assert_ok!(ctx.check());

        let bounded = RequestContext::background()
            .with_timeout(Duration::from_secs(5))
            .with_timeout(Duration::MAX);
        assert!(bounded.deadline().is_some());
    }

    #[tokio::test]
    async fn test_already_cancelled_wins_race() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::with_token(token);

        let result = ctx.run(async { 42 }).await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
