use thiserror::Error;

/// Failure of a single sync attempt. Cloneable so the outcome can be published
/// to every subscriber.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Failed to decode holdings response: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Network(_) => "network",
            SyncError::Decode(_) => "decode",
        }
    }

    /// Message shown at the consumer boundary.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Network(_) => "No Internet Connection".to_string(),
            SyncError::Decode(_) => "Unable to read holdings data".to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown store backend '{0}', expected sqlite, csv or memory")]
    UnknownStore(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_hides_details() {
        let err = SyncError::Network("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message(), "No Internet Connection");
        assert_eq!(err.kind(), "network");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn json_errors_are_decode_errors() {
        let err: SyncError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), "decode");
    }
}
