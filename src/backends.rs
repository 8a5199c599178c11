use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConnectionError, GenerationError};
use crate::stub::generate_stub_result;
use crate::types::{GenerationParams, GenerationResult};

pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
pub const STATUS_PATH: &str = "system_stats";

/// The two calls made against a generation server. Neither retries.
#[async_trait]
pub trait ComfyBackend: Send + Sync {
    async fn check_status(&self, url: &str) -> Result<(), ConnectionError>;

    /// Returns exactly `params.batch_size` images. `batch_count` is not repeated here.
    async fn generate(&self, params: &GenerationParams) -> Result<GenerationResult, GenerationError>;
}

pub fn status_endpoint(url: &str) -> String {
    format!("{}/{}", url.trim().trim_end_matches('/'), STATUS_PATH)
}

/// Real status check over HTTP. Generation is simulated because no wire
/// format for it exists yet.
pub struct HttpBackend {
    client: reqwest::Client,
    status_timeout: Duration,
    generate_delay: Duration,
}

impl HttpBackend {
    pub fn new(status_timeout: Duration, generate_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            status_timeout,
            generate_delay,
        }
    }

    fn map_transport_error(&self, url: &str, error: reqwest::Error) -> ConnectionError {
        if error.is_timeout() {
            ConnectionError::Timeout {
                url: url.to_string(),
                timeout: self.status_timeout,
            }
        } else {
            ConnectionError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(STATUS_TIMEOUT, Duration::from_secs(3))
    }
}

#[async_trait]
impl ComfyBackend for HttpBackend {
    async fn check_status(&self, url: &str) -> Result<(), ConnectionError> {
        let endpoint = status_endpoint(url);
        let started_at = std::time::Instant::now();
        let request = self
            .client
            .get(&endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.status_timeout)
            .send();

        // The outer timeout also bounds connection setup on every platform.
        let response = match tokio::time::timeout(self.status_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => return Err(self.map_transport_error(url, error)),
            Err(_) => {
                return Err(ConnectionError::Timeout {
                    url: url.to_string(),
                    timeout: self.status_timeout,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let remaining = self.status_timeout.saturating_sub(started_at.elapsed());
        match tokio::time::timeout(remaining, response.json::<serde_json::Value>()).await {
            Ok(Ok(_)) => {}
            Ok(Err(error)) if error.is_timeout() => return Err(self.map_transport_error(url, error)),
            Ok(Err(error)) => {
                return Err(ConnectionError::MalformedPayload {
                    url: url.to_string(),
                    message: error.to_string(),
                })
            }
            Err(_) => {
                return Err(ConnectionError::Timeout {
                    url: url.to_string(),
                    timeout: self.status_timeout,
                })
            }
        }

        tracing::debug!(
            "status check ok url={} durationMs={}",
            url,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    async fn generate(&self, params: &GenerationParams) -> Result<GenerationResult, GenerationError> {
        tracing::debug!("generate model={} sampler={} batchSize={}", params.model, params.sampler, params.batch_size);
        tokio::time::sleep(self.generate_delay).await;
        Ok(generate_stub_result(params))
    }
}

/// Offline backend: every status check succeeds after `delay`.
pub struct StubBackend {
    delay: Duration,
}

impl StubBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl ComfyBackend for StubBackend {
    async fn check_status(&self, _url: &str) -> Result<(), ConnectionError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn generate(&self, params: &GenerationParams) -> Result<GenerationResult, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(generate_stub_result(params))
    }
}
