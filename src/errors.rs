use thiserror::Error;
use uuid::Uuid;

/// Error type that captures common entity store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{collection} record {id} already exists")]
    Duplicate { collection: &'static str, id: Uuid },
    #[error("{collection} record {id} not found")]
    Missing { collection: &'static str, id: Uuid },
    #[error("store lock poisoned")]
    Poisoned,
}
