//! Puente de notificación global estado → bus.
//!
//! El `StateManager` es genérico sobre un `ChangeNotifier`; la notificación
//! global es best-effort y nunca condiciona la corrección de los suscriptores
//! locales. `NullNotifier` es el default (sin bus); `BusNotifier` publica en
//! un `EventBus` compartido los eventos reservados `state:changed`,
//! `state:batch-changed` y `state:reset`.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::bus::EventBus;
use crate::constants::{EVENT_STATE_BATCH, EVENT_STATE_CHANGED, EVENT_STATE_RESET};

/// Cambio observable a nivel global.
#[derive(Debug, Clone)]
pub enum StateChange {
    Changed {
        key: String,
        next: Option<Value>,
        previous: Option<Value>,
    },
    BatchChanged { keys: Vec<String> },
    Reset { keys: Vec<String> },
}

pub trait ChangeNotifier: Send {
    fn notify(&mut self, change: StateChange);
}

/// Notificador nulo: el manager funciona sin bus asociado.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn notify(&mut self, _change: StateChange) {}
}

/// Publica cambios de estado en un `EventBus` compartido.
///
/// Las continuaciones asíncronas de los listeners se lanzan al runtime
/// ambiente (`detach`); los listeners síncronos corren dentro del lock. Un
/// lock envenenado se loguea y la notificación se descarta: best-effort.
pub struct BusNotifier {
    bus: Arc<Mutex<EventBus>>,
}

impl BusNotifier {
    pub fn new(bus: Arc<Mutex<EventBus>>) -> Self {
        Self { bus }
    }
}

impl ChangeNotifier for BusNotifier {
    fn notify(&mut self, change: StateChange) {
        let mut bus = match self.bus.lock() {
            Ok(bus) => bus,
            Err(_) => {
                tracing::warn!("event bus lock poisoned; dropping state notification");
                return;
            }
        };
        let (event, data) = match change {
            StateChange::Changed { key, next, previous } => {
                (EVENT_STATE_CHANGED, json!({ "key": key, "value": next, "previous": previous }))
            }
            StateChange::BatchChanged { keys } => (EVENT_STATE_BATCH, json!({ "keys": keys })),
            StateChange::Reset { keys } => (EVENT_STATE_RESET, json!({ "keys": keys })),
        };
        bus.dispatch(event, data).detach();
    }
}
