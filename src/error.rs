use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl From<reqwest::Error> for SalesError {
    fn from(e: reqwest::Error) -> Self {
        SalesError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SalesError>;
