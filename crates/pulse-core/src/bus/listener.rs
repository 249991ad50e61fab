//! Listeners del bus: entradas con prioridad y resultado de invocación.
//!
//! Un listener es una función `Fn(&EventRecord) -> ListenerResult`:
//! - `Ok(None)`: terminó de forma síncrona.
//! - `Ok(Some(fut))`: devuelve una continuación asíncrona que `emit` espera
//!   en conjunto (una que falla no bloquea a las demás).
//! - `Err(_)`: fallo del listener; se captura, se loguea y el despacho sigue
//!   con los siguientes.
//!
//! Los helpers `done()` y `defer(...)` cubren los dos casos habituales.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EventRecord;
use crate::errors::CoreError;

/// Continuación asíncrona devuelta por un listener.
pub type ListenerFuture = Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send>>;

/// Resultado de invocar un listener.
pub type ListenerResult = Result<Option<ListenerFuture>, CoreError>;

pub(crate) type ListenerFn = Arc<dyn Fn(&EventRecord) -> ListenerResult + Send + Sync>;

/// Identificador opaco devuelto por `subscribe`; es la única forma de borrar
/// un listener concreto (las closures boxeadas no son comparables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Entrada en la lista de listeners de un evento.
///
/// Invariante: la lista de cada evento se mantiene ordenada por prioridad
/// descendente; entre prioridades iguales el orden es el de inserción.
pub(crate) struct ListenerEntry {
    pub id: ListenerId,
    pub priority: i32,
    pub once: bool,
    pub callback: ListenerFn,
}

/// Listener terminado de forma síncrona.
#[inline]
pub fn done() -> ListenerResult {
    Ok(None)
}

/// Listener que continúa en una future.
#[inline]
pub fn defer(fut: impl Future<Output = Result<(), CoreError>> + Send + 'static) -> ListenerResult {
    Ok(Some(Box::pin(fut)))
}
