use std::time::Duration;

use api::{ApiError, ApiResult};
use tracing::warn;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds each request. Failures are handed back, never retried.
#[derive(Debug, Clone, Copy)]
pub struct RequestSender {
    pub wait_timeout: Duration,
}

impl Default for RequestSender {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl RequestSender {
    pub fn new(wait_timeout: Duration) -> Self {
        Self { wait_timeout }
    }

    pub async fn send<T, F>(&self, context: &'static str, func: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        match tokio::time::timeout(self.wait_timeout, func).await {
            Ok(value) => value,
            Err(elapsed) => {
                warn!("{context}: request timed out ({elapsed})");
                Err(ApiError::Timeout {
                    context,
                    timeout: self.wait_timeout,
                })
            }
        }
    }
}
