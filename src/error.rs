use std::time::Duration;

use thiserror::Error;

/// A failed status check. Every variant names the URL that was attempted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Connection timeout: {url} did not answer within {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },
    #[error("Server at {url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Could not reach {url}: {message}")]
    Transport { url: String, message: String },
    #[error("Server at {url} returned an unreadable status payload: {message}")]
    MalformedPayload { url: String, message: String },
}

impl ConnectionError {
    pub fn url(&self) -> &str {
        match self {
            ConnectionError::Timeout { url, .. }
            | ConnectionError::Status { url, .. }
            | ConnectionError::Transport { url, .. }
            | ConnectionError::MalformedPayload { url, .. } => url,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Invalid generation parameters: {0}")]
    InvalidParams(String),
    #[error("A generation is already in progress")]
    Busy,
    #[error("Generation failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_url() {
        let error = ConnectionError::Timeout {
            url: "http://10.0.0.2:8188".to_string(),
            timeout: Duration::from_secs(5),
        };
        let message = error.to_string();
        assert!(message.contains("timeout"));
        assert!(message.contains("http://10.0.0.2:8188"));
        assert!(message.contains("5000ms"));
        assert_eq!(error.url(), "http://10.0.0.2:8188");
    }

    #[test]
    fn status_message_names_url_and_code() {
        let error = ConnectionError::Status {
            url: "http://host:1".to_string(),
            status: 502,
        };
        assert_eq!(error.to_string(), "Server at http://host:1 responded with HTTP 502");
    }
}
