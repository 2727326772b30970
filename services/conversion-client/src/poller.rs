//! Conversion status polling.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use bomforge_models::{ConversionState, ConversionStatus};
use bomforge_utils::{log_error, log_warn, BackendConfig, BomForgeError, BomForgeResult};

use crate::client::ConversionClient;

/// Shortest accepted poll period; `tokio::time::interval` rejects zero
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

fn clamp_interval(interval: Duration) -> Duration {
    if interval < MIN_POLL_INTERVAL {
        warn!(requested_ms = interval.as_millis() as u64, "Poll interval too short, using 1ms");
        MIN_POLL_INTERVAL
    } else {
        interval
    }
}

/// Polls a conversion on a fixed interval until it completes or fails.
///
/// Retryable errors (transport failures, 5xx, request timeouts) are tolerated
/// up to `max_errors` consecutive times. Anything else ends the wait.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    client: ConversionClient,
    interval: Duration,
    timeout: Option<Duration>,
    max_errors: u32,
}

impl StatusPoller {
    pub fn new(client: ConversionClient, config: &BackendConfig) -> Self {
        Self {
            client,
            interval: clamp_interval(Duration::from_millis(config.poll_interval_ms)),
            timeout: config.poll_timeout_seconds.map(Duration::from_secs),
            max_errors: config.max_poll_errors,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = clamp_interval(interval);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_errors(mut self, max_errors: u32) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub async fn wait_for(&self, conversion_id: &str) -> BomForgeResult<ConversionStatus> {
        self.wait_with_progress(conversion_id, |_| {}).await
    }

    /// Like `wait_for`, calling `on_progress` with every status received
    pub async fn wait_with_progress<F>(&self, conversion_id: &str, on_progress: F) -> BomForgeResult<ConversionStatus>
    where
        F: FnMut(&ConversionStatus),
    {
        let polling = self.poll(conversion_id, on_progress);
        match self.timeout {
            Some(limit) => time::timeout(limit, polling).await.map_err(|_| {
                BomForgeError::timeout(format!(
                    "Conversion {} did not finish within {}s",
                    conversion_id,
                    limit.as_secs_f64()
                ))
            })?,
            None => polling.await,
        }
    }

    async fn poll<F>(&self, conversion_id: &str, mut on_progress: F) -> BomForgeResult<ConversionStatus>
    where
        F: FnMut(&ConversionStatus),
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_errors = 0u32;

        loop {
            ticker.tick().await;

            let status = match self.client.get_conversion_status(conversion_id).await {
                Ok(status) => status,
                Err(e) if e.is_retryable() && consecutive_errors < self.max_errors => {
                    consecutive_errors += 1;
                    log_warn!(e, "Status poll failed, retrying", conversion_id, attempt = consecutive_errors);
                    continue;
                }
                Err(e) => {
                    log_error!(e, "Giving up on conversion status", conversion_id);
                    return Err(e);
                }
            };

            consecutive_errors = 0;
            on_progress(&status);

            match status.status {
                ConversionState::Completed => {
                    debug!(conversion_id, "Conversion completed");
                    return Ok(status);
                }
                ConversionState::Failed => {
                    let message = status
                        .error_message
                        .unwrap_or_else(|| "Conversion failed".to_string());
                    return Err(BomForgeError::conversion_failed(conversion_id, message));
                }
                ConversionState::Processing => {
                    debug!(conversion_id, progress = status.progress, "Conversion in progress");
                }
            }
        }
    }
}
