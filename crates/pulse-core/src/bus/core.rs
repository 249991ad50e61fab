//! Implementación del `EventBus`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::listener::{ListenerEntry, ListenerFn, ListenerFuture, ListenerId, ListenerResult};
use super::middleware::{EventMiddleware, MiddlewareEntry, MiddlewareId};
use super::record::EventRecord;
use crate::constants::{EVENT_HISTORY_CAPACITY, HISTORY_QUERY_LIMIT};
use crate::errors::CoreError;
use crate::ring::Ring;

/// Bus de eventos en proceso.
///
/// Responsable de mantener las listas de listeners ordenadas por prioridad,
/// aplicar el pipeline de middleware y registrar cada emisión en la historia.
/// API de dueño único (`&mut self`): no hay locking interno. Para compartir
/// entre hilos, envolver en un `Mutex` externo (ver `BusNotifier`).
pub struct EventBus {
    listeners: HashMap<String, Vec<ListenerEntry>>,
    middleware: Vec<MiddlewareEntry>,
    history: Ring<EventRecord>,
}

/// Resultado de la fase síncrona de una emisión.
///
/// `pending` contiene las continuaciones devueltas por listeners asíncronos.
/// El caller decide cómo asentarlas: `settled().await` las espera en conjunto
/// (semántica all-settled), `detach()` las lanza al runtime ambiente sin
/// esperar. Soltar el outcome descarta las continuaciones pendientes.
#[must_use = "las continuaciones pendientes se descartan si no se asientan"]
pub struct EmitOutcome {
    pub record_id: Uuid,
    /// `true` si un middleware canceló la entrega (los listeners no corrieron).
    pub cancelled: bool,
    /// Listeners síncronos o asíncronos invocados sin error.
    pub delivered: usize,
    pending: Vec<ListenerFuture>,
}

impl EmitOutcome {
    fn cancelled(record_id: Uuid) -> Self {
        Self { record_id,
               cancelled: true,
               delivered: 0,
               pending: Vec::new() }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Espera todas las continuaciones pendientes. Un listener asíncrono que
    /// falla se loguea y no afecta a los demás.
    pub async fn settled(self) {
        if self.pending.is_empty() {
            return;
        }
        let results = futures::future::join_all(self.pending).await;
        for result in results {
            if let Err(err) = result {
                tracing::warn!(%err, "async listener rejected");
            }
        }
    }

    /// Lanza las continuaciones pendientes al runtime tokio ambiente sin
    /// esperarlas (el análogo a encolar microtareas). Si no hay runtime, las
    /// continuaciones se descartan con un warning.
    pub fn detach(self) {
        if self.pending.is_empty() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                for fut in self.pending {
                    handle.spawn(async move {
                        if let Err(err) = fut.await {
                            tracing::warn!(%err, "detached listener rejected");
                        }
                    });
                }
            }
            Err(_) => {
                tracing::warn!(dropped = self.pending.len(),
                               "no tokio runtime; dropping pending listener futures");
            }
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_history_capacity(EVENT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self { listeners: HashMap::new(),
               middleware: Vec::new(),
               history: Ring::new(capacity) }
    }

    /// Suscribe con prioridad 0.
    ///
    /// Nota sobre `"*"`: es un nombre literal, no un comodín real. Un listener
    /// de `"*"` sólo recibe emisiones dirigidas explícitamente a `"*"`.
    pub fn subscribe<F>(&mut self, event: &str, callback: F) -> ListenerId
        where F: Fn(&EventRecord) -> ListenerResult + Send + Sync + 'static
    {
        self.subscribe_at(event, 0, callback)
    }

    /// Suscribe con prioridad explícita (mayor = antes). Inserción estable:
    /// entre prioridades iguales, el nuevo listener queda después.
    pub fn subscribe_at<F>(&mut self, event: &str, priority: i32, callback: F) -> ListenerId
        where F: Fn(&EventRecord) -> ListenerResult + Send + Sync + 'static
    {
        self.insert_listener(event, priority, false, Arc::new(callback))
    }

    /// Suscripción de un solo disparo (prioridad 0). El listener se elimina
    /// del registro *antes* de ejecutar su callback, de modo que una emisión
    /// reentrante durante el propio callback no vuelve a dispararlo.
    pub fn subscribe_once<F>(&mut self, event: &str, callback: F) -> ListenerId
        where F: Fn(&EventRecord) -> ListenerResult + Send + Sync + 'static
    {
        self.subscribe_once_at(event, 0, callback)
    }

    pub fn subscribe_once_at<F>(&mut self, event: &str, priority: i32, callback: F) -> ListenerId
        where F: Fn(&EventRecord) -> ListenerResult + Send + Sync + 'static
    {
        self.insert_listener(event, priority, true, Arc::new(callback))
    }

    fn insert_listener(&mut self, event: &str, priority: i32, once: bool, callback: ListenerFn) -> ListenerId {
        let entry = ListenerEntry { id: ListenerId::new(),
                                    priority,
                                    once,
                                    callback };
        let id = entry.id;
        let bucket = self.listeners.entry(event.to_string()).or_default();
        // detrás del último con prioridad >= a la nueva (orden estable)
        let position = bucket.iter().position(|l| l.priority < priority).unwrap_or(bucket.len());
        bucket.insert(position, entry);
        id
    }

    /// Elimina exactamente el listener identificado por `id`. Error de caller
    /// si el id no existe bajo ese evento.
    pub fn unsubscribe(&mut self, event: &str, id: ListenerId) -> Result<(), CoreError> {
        let bucket = self.listeners.get_mut(event).ok_or(CoreError::UnknownListener)?;
        let position = bucket.iter().position(|l| l.id == id).ok_or(CoreError::UnknownListener)?;
        bucket.remove(position);
        if bucket.is_empty() {
            self.listeners.remove(event);
        }
        Ok(())
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|b| b.len()).unwrap_or(0)
    }

    /// Añade un middleware al final del pipeline.
    ///
    /// Política de fallo heredada: un middleware que devuelve `Err` se loguea
    /// y el registro sigue **sin modificar**; la emisión no se bloquea.
    pub fn add_middleware<M>(&mut self, middleware: M) -> MiddlewareId
        where M: EventMiddleware + 'static
    {
        let entry = MiddlewareEntry { id: MiddlewareId::new(),
                                      middleware: Box::new(middleware) };
        let id = entry.id;
        self.middleware.push(entry);
        id
    }

    pub fn remove_middleware(&mut self, id: MiddlewareId) -> Result<(), CoreError> {
        let position = self.middleware
                           .iter()
                           .position(|m| m.id == id)
                           .ok_or(CoreError::UnknownMiddleware)?;
        self.middleware.remove(position);
        Ok(())
    }

    /// Fase síncrona de una emisión: construye el registro, lo anota en la
    /// historia (siempre, también si luego se cancela), corre el pipeline de
    /// middleware y despacha a los listeners en orden de prioridad.
    ///
    /// El orden de despacho queda fijado aquí: todos los listeners se invocan
    /// de forma síncrona antes de que cualquier continuación asíncrona avance.
    pub fn dispatch(&mut self, event: &str, data: Value) -> EmitOutcome {
        let mut record = EventRecord::new(event, data);
        // la historia refleja intentos de emisión, no entregas
        self.history.push(record.clone());

        for entry in self.middleware.iter() {
            match entry.middleware.apply(record.clone()) {
                Ok(Some(next)) => record = next,
                Ok(None) => {
                    tracing::debug!(event, middleware = ?entry.id, "emission cancelled by middleware");
                    return EmitOutcome::cancelled(record.id);
                }
                Err(err) => {
                    tracing::warn!(event, middleware = ?entry.id, %err,
                                   "middleware failed; record passes through unchanged");
                }
            }
        }

        let snapshot: Vec<(ListenerId, bool, ListenerFn)> =
            self.listeners
                .get(event)
                .map(|bucket| {
                    bucket.iter()
                          .map(|l| (l.id, l.once, Arc::clone(&l.callback)))
                          .collect()
                })
                .unwrap_or_default();

        let mut delivered = 0usize;
        let mut pending: Vec<ListenerFuture> = Vec::new();
        for (id, once, callback) in snapshot {
            if once {
                // baja del registro antes de correr la lógica de usuario
                let _ = self.unsubscribe(event, id);
            }
            match callback(&record) {
                Ok(Some(fut)) => {
                    delivered += 1;
                    pending.push(fut);
                }
                Ok(None) => delivered += 1,
                Err(err) => {
                    tracing::warn!(event, listener = ?id, %err, "listener failed");
                }
            }
        }

        EmitOutcome { record_id: record.id,
                      cancelled: false,
                      delivered,
                      pending }
    }

    /// Emite y espera a que todas las continuaciones asíncronas asienten.
    /// El punto de suspensión existe exactamente cuando al menos un listener
    /// devolvió una future.
    pub async fn emit(&mut self, event: &str, data: Value) -> EmitOutcome {
        let mut outcome = self.dispatch(event, data);
        let pending = std::mem::take(&mut outcome.pending);
        if !pending.is_empty() {
            let results = futures::future::join_all(pending).await;
            for result in results {
                if let Err(err) = result {
                    tracing::warn!(event, %err, "async listener rejected");
                }
            }
        }
        outcome
    }

    /// Devuelve los `limit` registros más recientes (del más antiguo al más
    /// reciente), opcionalmente filtrados por nombre. No muta la historia.
    pub fn history(&self, event: Option<&str>, limit: usize) -> Vec<EventRecord> {
        let selected: Vec<EventRecord> = self.history
                                             .iter()
                                             .filter(|r| event.map_or(true, |name| r.name == name))
                                             .cloned()
                                             .collect();
        let start = selected.len().saturating_sub(limit);
        selected[start..].to_vec()
    }

    /// Consulta de historia con el límite por defecto.
    pub fn recent_history(&self, event: Option<&str>) -> Vec<EventRecord> {
        self.history(event, HISTORY_QUERY_LIMIT)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Teardown explícito: listeners, middleware e historia.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.middleware.clear();
        self.history.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
