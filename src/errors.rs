use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("API key is not set. Please set the API key first.")]
    ConfigMissing,

    #[error("Failed to fetch data for {symbol}. Error {status}.")]
    RemoteFetchFailed { symbol: String, status: u16 },

    #[error("Provider error: {0}")]
    ApiError(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, TickerError>;

// 用于从字符串创建错误
impl From<String> for TickerError {
    fn from(s: String) -> Self {
        TickerError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for TickerError {
    fn from(s: &str) -> Self {
        TickerError::Unknown(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_message_carries_status() {
        let err = TickerError::RemoteFetchFailed { symbol: "AAPL".to_string(), status: 503 };
        assert_eq!(err.to_string(), "Failed to fetch data for AAPL. Error 503.");
    }

    #[test]
    fn plain_strings_become_unknown() {
        assert!(matches!(TickerError::from("boom"), TickerError::Unknown(s) if s == "boom"));
    }
}
