//! Sobre de snapshot `{ state, timestamp, version }`.
//!
//! Es el único formato semi-estable del núcleo: lo que `export` produce y lo
//! que el código cliente persiste (archivo, storage local) y devuelve luego a
//! `import`. La validación es "validate-then-apply": un sobre malformado
//! falla con error descriptivo antes de tocar el estado.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SNAPSHOT_VERSION;
use crate::errors::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: IndexMap<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl Snapshot {
    pub(crate) fn now(state: IndexMap<String, Value>) -> Self {
        Self { state,
               timestamp: Utc::now(),
               version: SNAPSHOT_VERSION.to_string() }
    }

    /// Valida forma y versión del sobre.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let snapshot = Self::from_value_unchecked(value)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CoreError::UnsupportedSnapshotVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Valida sólo la forma (sin chequeo de versión).
    pub fn from_value_unchecked(value: &Value) -> Result<Self, CoreError> {
        serde_json::from_value(value.clone()).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, CoreError> {
        serde_json::to_value(self).map_err(|e| CoreError::Internal(e.to_string()))
    }
}
