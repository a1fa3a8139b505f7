//! Status polling for pending comparison jobs.
//!
//! The backend contract has no pacing of its own: a job is simply not
//! terminal until `top_matches` is populated, and there is no failure
//! status. The poller therefore paces itself with a fixed interval, caps
//! the number of status fetches, and carries a cancellation token so an
//! abandoned query releases the loop instead of leaking it. Fetches are
//! strictly sequential; there are never two outstanding status requests
//! for the same job.

use std::time::Duration;

use tokio::sync::watch;

use crate::client::{ApiClient, Tool};
use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::models::{CompareResponse, JobStatus};
use crate::progress::{PollEvent, PollProgressReporter};

/// Signals cancellation to an in-flight poll loop.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiving side held by the poll loop. Dropping the handle without
/// cancelling leaves the loop running to completion.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is signalled; pends forever if the handle
    /// was dropped without cancelling.
    async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

pub struct ResultPoller<'a> {
    client: &'a ApiClient,
    interval: Duration,
    max_attempts: u32,
}

impl<'a> ResultPoller<'a> {
    pub fn new(client: &'a ApiClient, config: &PollingConfig) -> Self {
        Self {
            client,
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// Poll until the job is terminal, the attempt budget runs out
    /// ([`Error::PollTimeout`]), or the token is cancelled. The interval
    /// elapses *between* fetches, not before the first one.
    pub async fn wait_for_result(
        &self,
        job_id: &str,
        cancel: &mut CancelToken,
        progress: &dyn PollProgressReporter,
    ) -> Result<JobStatus> {
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                }
            }
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            progress.report(PollEvent::Waiting {
                attempt,
                max: self.max_attempts,
            });

            let status = self.fetch_status(job_id).await?;
            if status.is_terminal() {
                progress.report(PollEvent::Complete {
                    matches: status.matches.len(),
                });
                return Ok(status);
            }
        }

        Err(Error::PollTimeout {
            attempts: self.max_attempts,
        })
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus> {
        let body = self
            .client
            .get_json(Tool::Compare, &format!("/status/{}", job_id))
            .await?;
        let resp: CompareResponse =
            serde_json::from_value(body).map_err(|_| Error::UnexpectedResponseShape)?;
        Ok(JobStatus::from(resp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let (_handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_flips_the_token() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn dropped_handle_does_not_cancel() {
        let (handle, token) = cancel_pair();
        drop(handle);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_signal() {
        let (handle, mut token) = cancel_pair();
        handle.cancel();
        // Must complete promptly rather than pend.
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("cancelled() should resolve once signalled");
    }
}
