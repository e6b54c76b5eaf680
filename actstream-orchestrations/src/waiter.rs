//! Fixed-interval polling until a remote status converges

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::control_plane::ControlPlaneError;

/// Wait before the first refresh
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);
/// Floor for the interval between refreshes
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);

// Stand-in deadline for timeouts too large to add to an instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `start + timeout`, saturating at roughly thirty years out
pub(crate) fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error(
        "timeout while waiting for activity stream ({identifier}) to become {target:?} \
         (last status: {last_status:?}, waited {elapsed:?})"
    )]
    Timeout {
        identifier: String,
        target: Vec<String>,
        last_status: Option<String>,
        elapsed: Duration,
    },

    #[error("error refreshing activity stream ({identifier}) status: {source}")]
    Query {
        identifier: String,
        #[source]
        source: ControlPlaneError,
    },

    #[error("unexpected activity stream ({identifier}) status {status:?}, wanted {target:?}")]
    UnexpectedStatus {
        identifier: String,
        status: String,
        target: Vec<String>,
    },
}

/// Timing of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub delay: Duration,
    pub interval: Duration,
    /// Pause between retries of a start call the cluster is not ready for
    pub retry_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            interval: MIN_POLL_INTERVAL,
            retry_interval: DEFAULT_DELAY,
        }
    }
}

impl PollSettings {
    /// Settings for a configured interval, raised to [`MIN_POLL_INTERVAL`] if lower
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            ..Self::default()
        }
    }
}

/// Polls a refresh function until it reports one of the target statuses
#[derive(Debug, Clone)]
pub struct StateWaiter {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    pub timeout: Duration,
    pub delay: Duration,
    pub interval: Duration,
}

impl StateWaiter {
    pub fn new(pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        let defaults = PollSettings::default();
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            timeout,
            delay: defaults.delay,
            interval: defaults.interval,
        }
    }

    pub fn with_polling(mut self, polling: &PollSettings) -> Self {
        self.delay = polling.delay;
        self.interval = polling.interval;
        self
    }

    /// Returns the first target status observed.
    ///
    /// Refresh errors abort immediately. A status outside both the pending and
    /// the target set is an error as well.
    pub async fn wait_for_status<F, Fut>(
        &self,
        identifier: &str,
        mut refresh: F,
    ) -> Result<String, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, ControlPlaneError>>,
    {
        let started = Instant::now();
        let deadline = deadline_after(started, self.timeout);

        tracing::info!(
            identifier,
            target = ?self.target,
            timeout = ?self.timeout,
            "Waiting for activity stream status"
        );

        if !self.delay.is_zero() {
            sleep(self.delay.min(self.timeout)).await;
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let status = refresh().await.map_err(|source| WaitError::Query {
                identifier: identifier.to_string(),
                source,
            })?;

            tracing::debug!(identifier, %status, attempt, "Refreshed activity stream status");

            if self.target.contains(&status) {
                tracing::info!(
                    identifier,
                    %status,
                    elapsed = ?started.elapsed(),
                    "Activity stream reached target status"
                );
                return Ok(status);
            }

            if !self.pending.contains(&status) {
                return Err(WaitError::UnexpectedStatus {
                    identifier: identifier.to_string(),
                    status,
                    target: self.target.clone(),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::Timeout {
                    identifier: identifier.to_string(),
                    target: self.target.clone(),
                    last_status: Some(status),
                    elapsed: now.duration_since(started),
                });
            }

            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
