//! Implementación del `StateManager`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::computed::ComputedBinding;
use super::history::HistoryEntry;
use super::middleware::StateMiddleware;
use super::notifier::{ChangeNotifier, NullNotifier, StateChange};
use super::snapshot::Snapshot;
use crate::constants::STATE_HISTORY_CAPACITY;
use crate::errors::CoreError;
use crate::json;
use crate::ring::Ring;

/// Opciones de `set`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// No notificar a los suscriptores directos de la clave (la notificación
    /// global al bus tampoco se emite).
    pub silent: bool,
    /// Merge shallow del valor entrante sobre el actual cuando ambos son
    /// objetos planos.
    pub merge: bool,
}

/// Opciones de `subscribe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Invocar el callback inmediatamente con el valor actual antes de
    /// devolver.
    pub immediate: bool,
}

/// Opciones de `import`.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Fusionar sobre el estado actual en lugar de reemplazarlo por completo.
    pub merge: bool,
    /// Chequear la versión del sobre además de su forma.
    pub validate: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { merge: false, validate: true }
    }
}

/// Identificador opaco devuelto por `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type SubscriberFn = Arc<dyn Fn(Option<&Value>, Option<&Value>) -> Result<(), CoreError> + Send + Sync>;

struct SubscriberEntry {
    id: SubscriberId,
    callback: SubscriberFn,
}

/// Store reactivo clave-valor, fuente única de verdad del estado de sesión.
///
/// Genérico sobre el `ChangeNotifier` que publica cambios globales (nulo por
/// defecto). API de dueño único (`&mut self`), sin locking interno: para uso
/// multi-hilo envolver en un `Mutex` o detrás de un actor.
///
/// Invariantes:
/// - Un `set` cuyo valor resultante es estructuralmente igual al actual es un
///   no-op completo: sin historia, sin notificación, sin evento global.
/// - Un replay de time travel nunca escribe historia nueva (flag de guard).
/// - Las caches de claves derivadas se invalidan en cada commit de una
///   dependencia, haya o no suscriptores escuchando.
pub struct StateManager<N: ChangeNotifier = NullNotifier> {
    store: IndexMap<String, Value>,
    subscribers: HashMap<String, Vec<SubscriberEntry>>,
    middleware: Vec<Box<dyn StateMiddleware>>,
    computed: Vec<ComputedBinding>,
    history: Ring<HistoryEntry>,
    replaying: bool,
    notifier: N,
}

impl StateManager<NullNotifier> {
    /// Manager sin bus asociado.
    pub fn new() -> Self {
        Self::with_notifier(NullNotifier)
    }
}

impl Default for StateManager<NullNotifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: ChangeNotifier> StateManager<N> {
    pub fn with_notifier(notifier: N) -> Self {
        Self::with_history_capacity(notifier, STATE_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(notifier: N, capacity: usize) -> Self {
        Self { store: IndexMap::new(),
               subscribers: HashMap::new(),
               middleware: Vec::new(),
               computed: Vec::new(),
               history: Ring::new(capacity),
               replaying: false,
               notifier }
    }

    /// Lee un valor. Soporta rutas con puntos para campos anidados: si la
    /// clave literal no existe, el primer segmento se busca en el store y el
    /// resto se recorre dentro del valor. Sólo lectura (no hay escritura
    /// anidada).
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.store.get(key) {
            return Some(value);
        }
        let (head, rest) = key.split_once('.')?;
        json::get_path(self.store.get(head)?, rest)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.store.keys()
    }

    /// Escribe un valor bajo `key`.
    ///
    /// Secuencia: middleware → merge opcional → no-op si el resultado es
    /// estructuralmente igual al actual → historia → commit → recálculo de
    /// claves derivadas → notificación a suscriptores (salvo `silent`) →
    /// notificación global best-effort.
    pub fn set(&mut self, key: &str, value: Value, options: SetOptions) {
        let previous = self.store.get(key).cloned();

        let mut next = value;
        for mw in self.middleware.iter() {
            next = mw.transform(key, next, previous.as_ref());
        }

        if options.merge {
            if let Some(prev) = previous.as_ref() {
                if prev.is_object() && next.is_object() {
                    next = json::merge_json(prev, &next);
                }
            }
        }

        // igualdad estructural, no por serialización
        if previous.as_ref() == Some(&next) {
            return;
        }

        self.commit(key, Some(next.clone()));
        self.refresh_computed(key);

        if !options.silent {
            self.notify_key(key, Some(&next), previous.as_ref());
            self.notifier.notify(StateChange::Changed { key: key.to_string(),
                                                        next: Some(next),
                                                        previous });
        }
    }

    /// `set` con merge forzado.
    pub fn update(&mut self, key: &str, value: Value, options: SetOptions) {
        let options = SetOptions { merge: true, ..options };
        self.set(key, value, options);
    }

    /// Commit de bajo nivel: historia (salvo replay) + escritura en el store.
    /// `next: None` elimina la clave.
    fn commit(&mut self, key: &str, next: Option<Value>) {
        let previous = self.store.get(key).cloned();
        if !self.replaying {
            self.history.push(HistoryEntry { key: key.to_string(),
                                             previous,
                                             next: next.clone(),
                                             ts: Utc::now() });
        }
        match next {
            Some(value) => {
                self.store.insert(key.to_string(), value);
            }
            None => {
                self.store.shift_remove(key);
            }
        }
    }

    /// Invalida y recalcula las claves derivadas que dependen de `changed`.
    fn refresh_computed(&mut self, changed: &str) {
        let affected: Vec<usize> = self.computed
                                       .iter()
                                       .enumerate()
                                       .filter(|(_, binding)| binding.depends_on(changed))
                                       .map(|(i, _)| i)
                                       .collect();
        for index in affected {
            // invalidación incondicional, incluso sin suscriptores
            self.computed[index].cached = None;
            self.recompute(index);
        }
    }

    /// Recalcula el binding `index`: commit silencioso del resultado y
    /// notificación manual de los suscriptores de la clave derivada. Si el
    /// valor derivado cambió, los dependientes de esa clave se refrescan en
    /// cascada.
    fn recompute(&mut self, index: usize) {
        let (key, deps, compute) = {
            let binding = &self.computed[index];
            (binding.key.clone(), binding.deps.clone(), Arc::clone(&binding.compute))
        };
        let inputs: Vec<Value> = deps.iter()
                                     .map(|dep| self.get(dep).cloned().unwrap_or(Value::Null))
                                     .collect();
        let next = compute(&inputs);
        let previous = self.store.get(&key).cloned();

        if previous.as_ref() == Some(&next) {
            self.computed[index].cached = Some(next);
            return;
        }

        self.commit(&key, Some(next.clone()));
        self.computed[index].cached = Some(next.clone());
        self.notify_key(&key, Some(&next), previous.as_ref());
        self.refresh_computed(&key);
    }

    /// Notifica a los suscriptores directos de `key`. Un callback que falla se
    /// loguea y no interrumpe a los demás ni al caller de `set`.
    fn notify_key(&self, key: &str, next: Option<&Value>, previous: Option<&Value>) {
        let callbacks: Vec<(SubscriberId, SubscriberFn)> =
            self.subscribers
                .get(key)
                .map(|bucket| {
                    bucket.iter()
                          .map(|s| (s.id, Arc::clone(&s.callback)))
                          .collect()
                })
                .unwrap_or_default();
        for (id, callback) in callbacks {
            if let Err(err) = callback(next, previous) {
                tracing::warn!(key, subscriber = ?id, %err, "state subscriber failed");
            }
        }
    }

    /// Suscribe a los cambios de una clave exacta. El callback recibe
    /// `(nuevo, anterior)`.
    pub fn subscribe<F>(&mut self, key: &str, callback: F, options: SubscribeOptions) -> SubscriberId
        where F: Fn(Option<&Value>, Option<&Value>) -> Result<(), CoreError> + Send + Sync + 'static
    {
        let entry = SubscriberEntry { id: SubscriberId::new(),
                                      callback: Arc::new(callback) };
        let id = entry.id;
        if options.immediate {
            let current = self.get(key).cloned();
            if let Err(err) = (entry.callback)(current.as_ref(), None) {
                tracing::warn!(key, subscriber = ?id, %err, "immediate subscriber callback failed");
            }
        }
        self.subscribers.entry(key.to_string()).or_default().push(entry);
        id
    }

    pub fn unsubscribe(&mut self, key: &str, id: SubscriberId) -> Result<(), CoreError> {
        let bucket = self.subscribers.get_mut(key).ok_or(CoreError::UnknownSubscriber)?;
        let position = bucket.iter().position(|s| s.id == id).ok_or(CoreError::UnknownSubscriber)?;
        bucket.remove(position);
        if bucket.is_empty() {
            self.subscribers.remove(key);
        }
        Ok(())
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers.get(key).map(|b| b.len()).unwrap_or(0)
    }

    /// Añade un middleware de estado al final del pipeline.
    pub fn add_middleware<M>(&mut self, middleware: M)
        where M: StateMiddleware + 'static
    {
        self.middleware.push(Box::new(middleware));
    }

    /// Registra una clave derivada con cálculo inicial eager. El resultado se
    /// compromete de forma silenciosa y los suscriptores de la clave derivada
    /// se notifican manualmente en cada recálculo.
    pub fn computed<F>(&mut self, key: &str, deps: &[&str], compute: F) -> Result<(), CoreError>
        where F: Fn(&[Value]) -> Value + Send + Sync + 'static
    {
        if self.computed.iter().any(|b| b.key == key) {
            return Err(CoreError::ComputedKeyTaken(key.to_string()));
        }
        self.computed.push(ComputedBinding { key: key.to_string(),
                                             deps: deps.iter().map(|d| (*d).to_string()).collect(),
                                             compute: Arc::new(compute),
                                             cached: None });
        let index = self.computed.len() - 1;
        self.recompute(index);
        Ok(())
    }

    /// Da de baja un binding derivado. El último valor calculado permanece en
    /// el store como valor ordinario.
    pub fn remove_computed(&mut self, key: &str) -> Result<(), CoreError> {
        let position = self.computed
                           .iter()
                           .position(|b| b.key == key)
                           .ok_or_else(|| CoreError::UnknownComputed(key.to_string()))?;
        self.computed.remove(position);
        Ok(())
    }

    /// Aplica un lote de escrituras de forma atómica para los observadores:
    /// todos los commits primero (en silencio), después una notificación por
    /// clave afectada, y al final un único evento global agregado. Ningún
    /// suscriptor observa el lote a medio aplicar.
    pub fn batch(&mut self, updates: Map<String, Value>) {
        let mut affected: Vec<(String, Option<Value>, Value)> = Vec::new();
        for (key, value) in updates {
            let previous = self.store.get(&key).cloned();
            let mut next = value;
            for mw in self.middleware.iter() {
                next = mw.transform(&key, next, previous.as_ref());
            }
            if previous.as_ref() == Some(&next) {
                continue; // no-op: ni historia ni notificación
            }
            self.commit(&key, Some(next.clone()));
            affected.push((key, previous, next));
        }
        if affected.is_empty() {
            return;
        }
        for (key, _, _) in affected.iter() {
            self.refresh_computed(key);
        }
        for (key, previous, next) in affected.iter() {
            self.notify_key(key, Some(next), previous.as_ref());
        }
        let keys = affected.into_iter().map(|(key, _, _)| key).collect();
        self.notifier.notify(StateChange::BatchChanged { keys });
    }

    /// Deshace hasta `steps` cambios (LIFO), reponiendo el valor anterior de
    /// cada entrada bajo el guard de replay (deshacer no escribe historia).
    /// Destructivo: no hay stack de redo. Devuelve cuántas entradas aplicó;
    /// con la historia vacía es un no-op.
    pub fn time_travel(&mut self, steps: usize) -> usize {
        let mut applied = 0usize;
        for _ in 0..steps {
            let entry = match self.history.pop_last() {
                Some(entry) => entry,
                None => break,
            };
            let current = self.store.get(&entry.key).cloned();
            self.replaying = true;
            self.commit(&entry.key, entry.previous.clone());
            self.refresh_computed(&entry.key);
            self.notify_key(&entry.key, entry.previous.as_ref(), current.as_ref());
            self.replaying = false;
            applied += 1;
        }
        applied
    }

    /// Snapshot serializable del estado completo o de un subconjunto de
    /// claves.
    pub fn export(&self, keys: Option<&[&str]>) -> Snapshot {
        let state: IndexMap<String, Value> = match keys {
            Some(keys) => keys.iter()
                              .filter_map(|k| self.store.get(*k).map(|v| ((*k).to_string(), v.clone())))
                              .collect(),
            None => self.store.clone(),
        };
        Snapshot::now(state)
    }

    /// Importa un sobre de snapshot. Validate-then-apply: un sobre malformado
    /// (o de versión incompatible, cuando `validate`) falla antes de cualquier
    /// mutación. Sin `merge`, las claves ausentes del snapshot se eliminan.
    pub fn import(&mut self, data: &Value, options: ImportOptions) -> Result<(), CoreError> {
        let snapshot = if options.validate {
            Snapshot::from_value(data)?
        } else {
            Snapshot::from_value_unchecked(data)?
        };
        self.apply_snapshot(snapshot, options.merge);
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, merge: bool) {
        if !merge {
            let stale: Vec<String> = self.store
                                         .keys()
                                         .filter(|k| !snapshot.state.contains_key(*k))
                                         .cloned()
                                         .collect();
            for key in stale {
                let previous = self.store.get(&key).cloned();
                self.commit(&key, None);
                self.refresh_computed(&key);
                self.notify_key(&key, None, previous.as_ref());
            }
        }
        for (key, value) in snapshot.state {
            self.set(&key, value, SetOptions::default());
        }
    }

    /// Limpia claves concretas, o todo el estado (más caches derivadas e
    /// historia) si no se pasan claves. En la limpieza total, todos los
    /// suscriptores existentes reciben `(None, None)`.
    pub fn reset(&mut self, keys: Option<&[&str]>) {
        match keys {
            Some(keys) => {
                let mut cleared: Vec<String> = Vec::new();
                for key in keys {
                    let previous = match self.store.get(*key).cloned() {
                        Some(previous) => previous,
                        None => continue,
                    };
                    self.commit(key, None);
                    self.refresh_computed(key);
                    self.notify_key(key, None, Some(&previous));
                    cleared.push((*key).to_string());
                }
                if !cleared.is_empty() {
                    self.notifier.notify(StateChange::Reset { keys: cleared });
                }
            }
            None => {
                let keys: Vec<String> = self.store.keys().cloned().collect();
                self.store.clear();
                for binding in self.computed.iter_mut() {
                    binding.cached = None;
                }
                self.history.clear();
                let subscribed: Vec<String> = self.subscribers.keys().cloned().collect();
                for key in subscribed {
                    self.notify_key(&key, None, None);
                }
                self.notifier.notify(StateChange::Reset { keys });
            }
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Entradas de historia más recientes (de la más antigua a la más nueva).
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries: Vec<HistoryEntry> = self.history.iter().cloned().collect();
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    /// Teardown explícito: store, suscriptores, middleware, bindings e
    /// historia.
    pub fn clear(&mut self) {
        self.store.clear();
        self.subscribers.clear();
        self.middleware.clear();
        self.computed.clear();
        self.history.clear();
        self.replaying = false;
    }
}
