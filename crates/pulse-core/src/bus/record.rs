//! Registro inmutable de una emisión.
//!
//! Un `EventRecord` se construye una sola vez por `emit` y no se modifica
//! después: el middleware que "transforma" produce un registro nuevo. La
//! historia del bus guarda el registro tal como se intentó emitir.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub data: Value, // payload JSON neutro; el bus no interpreta su semántica
    pub ts: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self { id: Uuid::new_v4(),
               name: name.into(),
               data,
               ts: Utc::now() }
    }

    /// Copia del registro con el payload reemplazado (conserva id y ts).
    /// Es la forma recomendada de transformar en middleware.
    pub fn with_data(&self, data: Value) -> Self {
        Self { id: self.id,
               name: self.name.clone(),
               data,
               ts: self.ts }
    }
}
