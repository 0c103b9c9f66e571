//! Error type shared across Courier crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CourierError>;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("compose error: {0}")]
    Compose(String),

    #[error("smtp error: {0}")]
    Smtp(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
