use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HannaError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Hanna code not found: {0}")]
    NotFound(String),

    #[error("Could not find a free name for '{name}' after {attempts} attempts")]
    NameExhausted { name: String, attempts: u32 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, HannaError>;
