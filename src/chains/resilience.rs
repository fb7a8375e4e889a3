use std::time::Duration;
use tokio::time::sleep;
use tracing::{warn, info, debug};

use crate::config::ActivitySettings;

/// Retry configuration: `max_attempts` tries, with `base_delay + step_delay * i`
/// slept after the i-th failed attempt (0-based).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub step_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(300),
            step_delay: Duration::from_millis(200),
        }
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &ActivitySettings) -> Self {
        Self {
            max_attempts: settings.receipt_attempts.max(1),
            base_delay: Duration::from_millis(settings.retry_base_delay_ms),
            step_delay: Duration::from_millis(settings.retry_step_delay_ms),
        }
    }

    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        self.base_delay + self.step_delay * attempt_index
    }
}

/// Run `operation` until it succeeds or attempts run out, returning the last error
pub async fn retry_with_backoff<F, T, Fut, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!("Operation {} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                warn!("Operation {} failed on attempt {}: {}", operation_name, attempt + 1, e);

                if attempt + 1 >= attempts {
                    debug!("Operation {} gave up after {} attempts", operation_name, attempts);
                    return Err(e);
                }

                sleep(config.delay_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_after(0), Duration::from_millis(300));
        assert_eq!(config.delay_after(1), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_backoff() {
        let config = RetryConfig {
            max_attempts: 3,
            ..Default::default()
        };

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(&config, "test_operation", || {
            let c = counter_clone.clone();
            async move {
                let count = c.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err("Simulated failure")
                } else {
                    Ok("Success")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("Success"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_return_last_error() {
        let config = RetryConfig::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), String> = retry_with_backoff(&config, "always_fails", || {
            let c = counter_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                Err(format!("failure {}", n))
            }
        })
        .await;

        assert_eq!(result, Err("failure 1".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
