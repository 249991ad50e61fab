//! Demo del núcleo reactivo: bus + state cableados por inyección explícita.
//!
//! Escenario: una "sesión" de aplicación que guarda preferencias y datos de
//! campaña, deriva un resumen, aplica un lote, deshace un cambio y persiste
//! el snapshot en disco para restaurarlo en una sesión nueva.

use std::sync::{Arc, Mutex};

use pulse_adapters::{FileSnapshotStore, SourceStamp, TrimStrings};
use pulse_core::constants::{EVENT_STATE_BATCH, EVENT_STATE_CHANGED};
use pulse_core::{defer, done, BusNotifier, EventBus, ImportOptions, SetOptions, StateManager,
                 SubscribeOptions};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Una instancia de cada componente por sesión, pasada explícitamente a
    // quien la necesita. No hay singletons globales.
    let bus = Arc::new(Mutex::new(EventBus::new()));
    {
        let mut bus = bus.lock().expect("bus lock");
        bus.add_middleware(SourceStamp::new("pulse-demo"));
        bus.subscribe(EVENT_STATE_CHANGED, |record| {
            tracing::info!(data = %record.data, "state changed");
            done()
        });
        bus.subscribe(EVENT_STATE_BATCH, |record| {
            tracing::info!(keys = %record.data["keys"], "batch applied");
            done()
        });
        // listener asíncrono: emit espera su continuación
        bus.subscribe_at("campaign:published", 10, |record| {
            let name = record.data["name"].clone();
            defer(async move {
                tracing::info!(%name, "campaign indexed downstream");
                Ok(())
            })
        });
    }

    let mut state = StateManager::with_notifier(BusNotifier::new(Arc::clone(&bus)));
    state.add_middleware(TrimStrings);

    state.computed("campaign:summary", &["campaign:name", "campaign:reach"], |inputs| {
             json!({
                 "name": inputs[0].clone(),
                 "reach": inputs[1].as_i64().unwrap_or(0),
             })
         })?;
    state.subscribe("campaign:summary",
                    |next, _previous| {
                        tracing::info!(summary = ?next, "summary recalculated");
                        Ok(())
                    },
                    SubscribeOptions::default());

    state.set("campaign:name", json!("  Lanzamiento otoño  "), SetOptions::default());
    state.set("campaign:reach", json!(12500), SetOptions::default());

    let mut updates: Map<String, Value> = Map::new();
    updates.insert("prefs:theme".into(), json!("dark"));
    updates.insert("prefs:lang".into(), json!("es"));
    state.batch(updates);

    // un borrador que se descarta con time travel
    state.set("draft:note", json!("texto provisional"), SetOptions::default());
    let undone = state.time_travel(1);
    tracing::info!(undone,
                   draft = ?state.get("draft:note"),
                   history = state.history_len(),
                   "time travel");

    // emisión con listener asíncrono: dispatch fija el orden, settled espera
    let outcome = {
        let mut bus = bus.lock().expect("bus lock");
        bus.dispatch("campaign:published", json!({"name": "Lanzamiento otoño"}))
    };
    outcome.settled().await;

    // persistir el sobre y restaurarlo en una "sesión" nueva
    let store = FileSnapshotStore::new(std::env::temp_dir().join("pulse-demo-session.json"));
    store.save_from(&state)?;

    let mut restored = StateManager::new();
    store.restore_into(&mut restored, ImportOptions::default())?;
    tracing::info!(keys = restored.len(),
                   theme = ?restored.get("prefs:theme"),
                   "session restored from {}",
                   store.path().display());

    let emissions = bus.lock().expect("bus lock").history(None, 100);
    tracing::info!(total = emissions.len(), "bus history at shutdown");
    Ok(())
}
