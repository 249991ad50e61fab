//! Middleware concretos sobre los contratos del core.

use pulse_core::{EventMiddleware, EventRecord, StateMiddleware};
use serde_json::{json, Value};

/// Middleware de bus que anota el origen de cada emisión.
///
/// Sólo toca payloads objeto: añade (o sobreescribe) la clave `"source"`.
/// Payloads no-objeto pasan sin modificar.
pub struct SourceStamp {
    source: String,
}

impl SourceStamp {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

impl EventMiddleware for SourceStamp {
    fn apply(&self, record: EventRecord) -> Result<Option<EventRecord>, pulse_core::CoreError> {
        match &record.data {
            Value::Object(map) => {
                let mut out = map.clone();
                out.insert("source".to_string(), json!(self.source));
                Ok(Some(record.with_data(Value::Object(out))))
            }
            _ => Ok(Some(record)),
        }
    }
}

/// Middleware de estado que recorta espacios en los extremos de todo valor
/// string (también dentro de objetos planos, un nivel). Normalización típica
/// de formularios antes del commit.
pub struct TrimStrings;

impl StateMiddleware for TrimStrings {
    fn transform(&self, _key: &str, value: Value, _previous: Option<&Value>) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            Value::Object(map) => {
                let trimmed = map.into_iter()
                                 .map(|(k, v)| match v {
                                     Value::String(s) => (k, Value::String(s.trim().to_string())),
                                     other => (k, other),
                                 })
                                 .collect();
                Value::Object(trimmed)
            }
            other => other,
        }
    }
}
