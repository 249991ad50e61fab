//! Entradas de la historia de cambios de estado.
//!
//! Una entrada por cambio comprometido, salvo durante un replay de time
//! travel (el guard de reentrada impide que deshacer escriba historia nueva).
//! `previous: None` significa que la clave no existía antes del cambio;
//! `next: None`, que el cambio la eliminó.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub previous: Option<Value>,
    pub next: Option<Value>,
    pub ts: DateTime<Utc>,
}
