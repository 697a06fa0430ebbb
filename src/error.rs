//! Error types for txhistory

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryError {
    ConfigError(String),
    DatabaseError(String),
    /// The HTTP request itself failed (connect, TLS, status read, body read)
    TransportError(String),
    /// The response body could not be decoded as JSON
    MalformedResponse(String),
    /// The body was JSON but `result` was missing or not a list
    UnexpectedShape(String),
    InvalidRecord(String),
    RenderError(String),
    IoError(String),
}

impl HistoryError {
    /// Short label used when a fetch failure is downgraded to an empty category
    pub fn kind(&self) -> &'static str {
        match self {
            HistoryError::ConfigError(_) => "config",
            HistoryError::DatabaseError(_) => "database",
            HistoryError::TransportError(_) => "transport",
            HistoryError::MalformedResponse(_) => "malformed response",
            HistoryError::UnexpectedShape(_) => "unexpected shape",
            HistoryError::InvalidRecord(_) => "invalid record",
            HistoryError::RenderError(_) => "render",
            HistoryError::IoError(_) => "io",
        }
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HistoryError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            HistoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            HistoryError::TransportError(msg) => write!(f, "Network error: {}", msg),
            HistoryError::MalformedResponse(msg) => {
                write!(f, "Could not decode JSON from response: {}", msg)
            }
            HistoryError::UnexpectedShape(msg) => {
                write!(f, "Unexpected response format: {}", msg)
            }
            HistoryError::InvalidRecord(msg) => write!(f, "Invalid transaction record: {}", msg),
            HistoryError::RenderError(msg) => write!(f, "Render error: {}", msg),
            HistoryError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::IoError(err.to_string())
    }
}

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        HistoryError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for HistoryError {
    fn from(err: reqwest::Error) -> Self {
        HistoryError::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::MalformedResponse(err.to_string())
    }
}

impl From<toml::de::Error> for HistoryError {
    fn from(err: toml::de::Error) -> Self {
        HistoryError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HistoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = HistoryError::UnexpectedShape("NOTOK".to_string());
        assert_eq!(err.to_string(), "Unexpected response format: NOTOK");
        assert_eq!(err.kind(), "unexpected shape");
    }

    #[test]
    fn test_serde_json_error_is_malformed_response() {
        let err: HistoryError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, HistoryError::MalformedResponse(_)));
    }
}
