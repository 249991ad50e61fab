//! Constantes del núcleo reactivo.
//!
//! Este módulo agrupa los valores estáticos que forman parte del contrato
//! observable: capacidades por defecto de los buffers de historia, la versión
//! del sobre de snapshot y los nombres de evento reservados que el
//! `StateManager` publica en el bus.

/// Capacidad por defecto de la historia del bus. Al llenarse se descarta el
/// registro más antiguo (FIFO).
pub const EVENT_HISTORY_CAPACITY: usize = 1000;

/// Capacidad por defecto de la historia de cambios de estado.
pub const STATE_HISTORY_CAPACITY: usize = 100;

/// Límite por defecto de una consulta de historia del bus.
pub const HISTORY_QUERY_LIMIT: usize = 100;

/// Versión del sobre `{ state, timestamp, version }` producido por
/// `StateManager::export`. Incrementar sólo ante cambios incompatibles del
/// formato; `import` rechaza versiones distintas cuando valida.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Evento global emitido tras cada cambio individual de estado.
pub const EVENT_STATE_CHANGED: &str = "state:changed";

/// Evento agregado emitido una única vez por lote aplicado.
pub const EVENT_STATE_BATCH: &str = "state:batch-changed";

/// Evento emitido al limpiar estado (total o por claves).
pub const EVENT_STATE_RESET: &str = "state:reset";

/// Nombre de evento comodín. Es un nombre literal como cualquier otro: un
/// listener de `"*"` sólo recibe emisiones dirigidas explícitamente a `"*"`,
/// no intercepta el resto de eventos.
pub const WILDCARD_EVENT: &str = "*";
