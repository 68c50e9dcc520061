use thiserror::Error;

#[derive(Debug, Error)]
pub enum TsdbError {
    /// The request never produced a usable response: connection refused,
    /// DNS failure, timeout or an HTTP status the API does not use for errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but did not report `status: "success"`.
    #[error("Invalid request ({error_type}): {message}")]
    InvalidRequest { error_type: String, message: String },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TsdbError {
    pub fn is_transport(&self) -> bool {
        matches!(self, TsdbError::Transport(_))
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, TsdbError::InvalidRequest { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, TsdbError::Parse(_))
    }

    /// Short label used for the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            TsdbError::Transport(_) => "transport",
            TsdbError::InvalidRequest { .. } => "invalid_request",
            TsdbError::Parse(_) => "parse",
            TsdbError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for TsdbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TsdbError::Transport(format!("request timed out: {}", err))
        } else {
            TsdbError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TsdbError {
    fn from(err: serde_json::Error) -> Self {
        TsdbError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TsdbError>;
