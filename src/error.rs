use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid market value: {0}. Expected 'bourse' or 'fara_bourse'.")]
    InvalidMarket(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
