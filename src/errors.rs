use crate::providers::ProviderError;
use thiserror::Error;

/// Application-level errors.
/// Some variants are reserved for future use as error handling is expanded.
#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

pub type AppResult<T> = Result<T, AppError>;
