//! pulse-core: núcleo reactivo (Event Bus + State Manager)
//!
//! Dos componentes hoja que cooperan:
//! - `bus`: pub/sub con prioridades, pipeline de middleware e historia FIFO.
//! - `state`: store reactivo con suscripciones, claves derivadas, historia
//!   para time travel y lotes atómicos; puede publicar cambios en el bus a
//!   través de un `ChangeNotifier`, pero funciona sin él.
//!
//! Ambos se construyen una vez por sesión y se pasan explícitamente a quien
//! los necesita (inyección de dependencias, sin singletons globales).

pub mod bus;
pub mod constants;
pub mod errors;
pub mod json;
pub mod ring;
pub mod state;

pub use bus::{defer, done, EmitOutcome, EventBus, EventMiddleware, EventRecord, ListenerFuture,
              ListenerId, ListenerResult, MiddlewareId};
pub use errors::CoreError;
pub use state::{BusNotifier, ChangeNotifier, HistoryEntry, ImportOptions, NullNotifier, SetOptions,
                Snapshot, StateChange, StateManager, StateMiddleware, SubscribeOptions, SubscriberId};

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::{Arc, Mutex};

	// Humo: bus y state conectados vía BusNotifier, sin runtime asíncrono.
	#[test]
	fn state_changes_reach_the_bus() {
		let bus = Arc::new(Mutex::new(EventBus::new()));
		let seen = Arc::new(Mutex::new(Vec::new()));

		{
			let seen = Arc::clone(&seen);
			bus.lock().unwrap().subscribe(constants::EVENT_STATE_CHANGED, move |record| {
				seen.lock().unwrap().push(record.data.clone());
				done()
			});
		}

		let mut state = StateManager::with_notifier(BusNotifier::new(Arc::clone(&bus)));
		state.set("theme", json!("dark"), SetOptions::default());

		let seen = seen.lock().unwrap();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0]["key"], json!("theme"));
		assert_eq!(seen[0]["value"], json!("dark"));
		assert_eq!(seen[0]["previous"], json!(null));
	}

	#[test]
	fn wildcard_is_a_literal_name() {
		let bus = Arc::new(Mutex::new(EventBus::new()));
		let hits = Arc::new(Mutex::new(0));
		{
			let hits = Arc::clone(&hits);
			bus.lock().unwrap().subscribe(constants::WILDCARD_EVENT, move |_r| {
				*hits.lock().unwrap() += 1;
				done()
			});
		}
		let mut bus_ref = bus.lock().unwrap();
		bus_ref.dispatch("user:login", json!({})).detach();
		assert_eq!(*hits.lock().unwrap(), 0);
		bus_ref.dispatch("*", json!({})).detach();
		assert_eq!(*hits.lock().unwrap(), 1);
	}
}
