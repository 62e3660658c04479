use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("parse failure: {0}")]
    ParseFailure(String),

    #[error("empty result: {0}")]
    EmptyResult(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid capacity {0}: must be > 0")]
    InvalidCapacity(usize),

    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::NetworkFailure(err.to_string())
    }

    pub fn parse(err: impl std::fmt::Display) -> Self {
        Self::ParseFailure(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseFailure(err.to_string())
        } else {
            Self::NetworkFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
