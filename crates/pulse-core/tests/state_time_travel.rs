//! Time travel: deshacer LIFO, guard de reentrada y no-op con historia vacía.

use std::sync::{Arc, Mutex};

use pulse_core::{SetOptions, StateManager, SubscribeOptions};
use serde_json::json;

#[test]
fn undo_restores_the_previous_value() {
    let mut state = StateManager::new();
    state.set("x", json!(1), SetOptions::default());
    state.set("x", json!(2), SetOptions::default());

    assert_eq!(state.time_travel(1), 1);
    assert_eq!(state.get("x"), Some(&json!(1)));
}

#[test]
fn undo_past_first_write_removes_the_key_and_then_noops() {
    let mut state = StateManager::new();
    state.set("x", json!(1), SetOptions::default());
    state.set("x", json!(2), SetOptions::default());

    // dos entradas de historia; la primera tiene previous = None
    assert_eq!(state.time_travel(5), 2);
    assert_eq!(state.get("x"), None);

    // historia agotada: no-op, sin pánico
    assert_eq!(state.time_travel(1), 0);
}

#[test]
fn replay_does_not_write_new_history() {
    let mut state = StateManager::new();
    state.set("x", json!(1), SetOptions::default());
    state.set("x", json!(2), SetOptions::default());
    assert_eq!(state.history_len(), 2);

    state.time_travel(1);
    // el replay consumió una entrada y no añadió ninguna
    assert_eq!(state.history_len(), 1);
}

#[test]
fn replay_notifies_subscribers_with_restored_value() {
    let mut state = StateManager::new();
    state.set("x", json!(1), SetOptions::default());
    state.set("x", json!(2), SetOptions::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        state.subscribe("x",
                        move |next, previous| {
                            seen.lock().unwrap().push((next.cloned(), previous.cloned()));
                            Ok(())
                        },
                        SubscribeOptions::default());
    }

    state.time_travel(1);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (Some(json!(1)), Some(json!(2))));
}

#[test]
fn undo_refreshes_computed_keys() {
    let mut state = StateManager::new();
    state.set("n", json!(2), SetOptions::default());
    state.computed("double", &["n"], |inputs| json!(inputs[0].as_i64().unwrap_or(0) * 2))
         .unwrap();

    state.set("n", json!(5), SetOptions::default());
    assert_eq!(state.get("double"), Some(&json!(10)));

    // deshacer los commits del recálculo y del set hasta volver a n = 2
    while state.get("n") != Some(&json!(2)) {
        assert!(state.time_travel(1) > 0, "history exhausted before reaching n = 2");
    }
    assert_eq!(state.get("double"), Some(&json!(4)));
}
