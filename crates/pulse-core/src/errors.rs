//! Errores del núcleo reactivo (bus + state).
//!
//! Convención: los errores de caller (ids desconocidos, snapshots malformados,
//! claves derivadas duplicadas) se devuelven como `Err` al llamador inmediato.
//! Los fallos dentro de callbacks (listeners, suscriptores, middleware) se
//! capturan en el punto de despacho y se loguean; nunca se propagan.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("unknown listener id")] UnknownListener,
    #[error("unknown middleware id")] UnknownMiddleware,
    #[error("unknown subscriber id")] UnknownSubscriber,
    #[error("unknown computed key: {0}")] UnknownComputed(String),
    #[error("computed key already registered: {0}")] ComputedKeyTaken(String),
    #[error("invalid snapshot: {0}")] InvalidSnapshot(String),
    #[error("unsupported snapshot version: {0}")] UnsupportedSnapshotVersion(String),
    #[error("callback failed: {0}")] Callback(String),
    #[error("internal: {0}")] Internal(String),
}
