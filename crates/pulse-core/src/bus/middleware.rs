//! Contrato del pipeline de middleware del bus.
//!
//! Un `EventMiddleware` recibe el `EventRecord` y decide:
//! - `Ok(Some(record))`: deja pasar (posiblemente transformado).
//! - `Ok(None)`: cancela la entrega; no corre más middleware ni listeners.
//! - `Err(_)`: fallo del middleware. Se loguea y el registro continúa **sin
//!   modificar** hacia el siguiente middleware (política heredada del sistema
//!   original; un middleware que falla no bloquea la emisión).
//!
//! El pipeline se aplica en orden de registro, antes de cualquier listener.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EventRecord;
use crate::errors::CoreError;

pub trait EventMiddleware: Send + Sync {
    /// Transforma o cancela el registro. Implementaciones deben ser rápidas y
    /// sin efectos sobre el propio bus.
    fn apply(&self, record: EventRecord) -> Result<Option<EventRecord>, CoreError>;
}

impl<F> EventMiddleware for F
    where F: Fn(EventRecord) -> Result<Option<EventRecord>, CoreError> + Send + Sync
{
    fn apply(&self, record: EventRecord) -> Result<Option<EventRecord>, CoreError> {
        self(record)
    }
}

/// Identificador opaco devuelto por `add_middleware`; la eliminación es por
/// id (no hay identidad de closures en Rust).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MiddlewareId(Uuid);

impl MiddlewareId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

pub(crate) struct MiddlewareEntry {
    pub id: MiddlewareId,
    pub middleware: Box<dyn EventMiddleware>,
}
