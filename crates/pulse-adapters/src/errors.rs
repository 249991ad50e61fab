//! Errores de la capa de adaptadores.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] pulse_core::CoreError),
}
