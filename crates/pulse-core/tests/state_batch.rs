//! Lotes: notificación única por clave afectada, commits antes de cualquier
//! notificación y evento global agregado.

use std::sync::{Arc, Mutex};

use pulse_core::constants::EVENT_STATE_BATCH;
use pulse_core::{done, BusNotifier, EventBus, SetOptions, StateManager, SubscribeOptions};
use serde_json::{json, Map, Value};

fn updates(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

#[test]
fn each_affected_subscriber_fires_exactly_once() {
    let mut state = StateManager::new();
    let hits_a = Arc::new(Mutex::new(0));
    let hits_b = Arc::new(Mutex::new(0));
    {
        let hits = Arc::clone(&hits_a);
        state.subscribe("a",
                        move |_n, _p| {
                            *hits.lock().unwrap() += 1;
                            Ok(())
                        },
                        SubscribeOptions::default());
    }
    {
        let hits = Arc::clone(&hits_b);
        state.subscribe("b",
                        move |_n, _p| {
                            *hits.lock().unwrap() += 1;
                            Ok(())
                        },
                        SubscribeOptions::default());
    }

    state.batch(updates(&[("a", json!(1)), ("b", json!(2))]));

    assert_eq!(*hits_a.lock().unwrap(), 1);
    assert_eq!(*hits_b.lock().unwrap(), 1);
    assert_eq!(state.get("a"), Some(&json!(1)));
    assert_eq!(state.get("b"), Some(&json!(2)));
}

#[test]
fn notifications_only_run_after_the_whole_batch_committed() {
    // el orden observable es: commits de todas las claves, luego una
    // notificación por clave. Con un notifier de bus, el suscriptor del
    // evento por clave ve ambos valores ya aplicados en el payload agregado.
    let mut state = StateManager::new();
    let notified = Arc::new(Mutex::new(0));
    {
        let notified = Arc::clone(&notified);
        state.subscribe("a",
                        move |_n, _p| {
                            *notified.lock().unwrap() += 1;
                            Ok(())
                        },
                        SubscribeOptions::default());
    }

    state.batch(updates(&[("a", json!(1)), ("b", json!(2))]));
    // dos commits en historia, una sola notificación de "a"
    assert_eq!(state.history_len(), 2);
    assert_eq!(*notified.lock().unwrap(), 1);
}

#[test]
fn batch_emits_one_aggregate_event_with_all_keys() {
    let bus = Arc::new(Mutex::new(EventBus::new()));
    let batches = Arc::new(Mutex::new(Vec::new()));
    {
        let batches = Arc::clone(&batches);
        bus.lock().unwrap().subscribe(EVENT_STATE_BATCH, move |record| {
            batches.lock().unwrap().push(record.data.clone());
            done()
        });
    }

    let mut state = StateManager::with_notifier(BusNotifier::new(Arc::clone(&bus)));
    state.batch(updates(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]));

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["keys"], json!(["a", "b", "c"]));
}

#[test]
fn noop_pairs_are_skipped_inside_a_batch() {
    let mut state = StateManager::new();
    state.set("a", json!(1), SetOptions::default());

    let hits = Arc::new(Mutex::new(0));
    {
        let hits = Arc::clone(&hits);
        state.subscribe("a",
                        move |_n, _p| {
                            *hits.lock().unwrap() += 1;
                            Ok(())
                        },
                        SubscribeOptions::default());
    }

    state.batch(updates(&[("a", json!(1)), ("b", json!(2))]));
    assert_eq!(*hits.lock().unwrap(), 0);
    assert_eq!(state.get("b"), Some(&json!(2)));
}

#[test]
fn empty_or_all_noop_batch_emits_nothing() {
    let bus = Arc::new(Mutex::new(EventBus::new()));
    let mut state = StateManager::with_notifier(BusNotifier::new(Arc::clone(&bus)));
    state.set("a", json!(1), SetOptions::default());

    state.batch(updates(&[("a", json!(1))]));
    state.batch(Map::new());

    // única emisión registrada: el state:changed del set inicial
    assert_eq!(bus.lock().unwrap().history(Some(EVENT_STATE_BATCH), 100).len(), 0);
}
