//! Despacho del bus: orden por prioridad, bajas, aislamiento de fallos y
//! listeners asíncronos.

use std::sync::{Arc, Mutex};

use pulse_core::{defer, done, CoreError, EventBus};
use serde_json::json;

#[test]
fn priority_order_is_descending_and_stable() {
    let mut bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    // A (5), B (10), C (5): debe despachar B, A, C
    for (tag, priority) in [("A", 5), ("B", 10), ("C", 5)] {
        let order = Arc::clone(&order);
        bus.subscribe_at("ping", priority, move |_record| {
            order.lock().unwrap().push(tag);
            done()
        });
    }

    let outcome = bus.dispatch("ping", json!({}));
    assert!(!outcome.cancelled);
    assert_eq!(outcome.delivered, 3);
    assert_eq!(*order.lock().unwrap(), vec!["B", "A", "C"]);
    outcome.detach();
}

#[test]
fn once_listener_fires_a_single_time() {
    let mut bus = EventBus::new();
    let hits = Arc::new(Mutex::new(0));
    {
        let hits = Arc::clone(&hits);
        bus.subscribe_once("boot", move |_record| {
            *hits.lock().unwrap() += 1;
            done()
        });
    }
    assert_eq!(bus.listener_count("boot"), 1);

    bus.dispatch("boot", json!({})).detach();
    // ya dado de baja antes de correr el callback
    assert_eq!(bus.listener_count("boot"), 0);
    bus.dispatch("boot", json!({})).detach();
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn unsubscribe_removes_exactly_one_listener() {
    let mut bus = EventBus::new();
    let id_a = bus.subscribe("tick", |_r| done());
    let _id_b = bus.subscribe("tick", |_r| done());

    bus.unsubscribe("tick", id_a).unwrap();
    assert_eq!(bus.listener_count("tick"), 1);

    // error de caller: id ya eliminado
    assert_eq!(bus.unsubscribe("tick", id_a), Err(CoreError::UnknownListener));
    // evento sin bucket
    let stray = bus.subscribe("other", |_r| done());
    bus.unsubscribe("other", stray).unwrap();
    assert_eq!(bus.unsubscribe("other", stray), Err(CoreError::UnknownListener));
}

#[test]
fn failing_listener_does_not_block_siblings() {
    let mut bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    {
        let order = Arc::clone(&order);
        bus.subscribe_at("job", 10, move |_r| {
            order.lock().unwrap().push("first");
            Err(CoreError::Callback("boom".into()))
        });
    }
    {
        let order = Arc::clone(&order);
        bus.subscribe_at("job", 5, move |_r| {
            order.lock().unwrap().push("second");
            done()
        });
    }

    let outcome = bus.dispatch("job", json!({}));
    // el fallo se aísla: delivered sólo cuenta los que no fallaron
    assert_eq!(outcome.delivered, 1);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    outcome.detach();
}

#[tokio::test]
async fn emit_awaits_async_listeners_all_settled() {
    let mut bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let log = Arc::clone(&log);
        bus.subscribe_at("save", 10, move |_r| {
            let log = Arc::clone(&log);
            defer(async move {
                log.lock().unwrap().push("slow-ok");
                Ok(())
            })
        });
    }
    {
        // un listener asíncrono que falla no bloquea a los demás
        bus.subscribe_at("save", 5, move |_r| {
            defer(async move { Err(CoreError::Callback("async boom".into())) })
        });
    }
    {
        let log = Arc::clone(&log);
        bus.subscribe_at("save", 1, move |_r| {
            log.lock().unwrap().push("sync");
            done()
        });
    }

    let outcome = bus.emit("save", json!({"doc": 1})).await;
    assert_eq!(outcome.delivered, 3);
    assert_eq!(outcome.pending_count(), 0);

    let log = log.lock().unwrap();
    // la fase síncrona corre completa antes de que avance cualquier future
    assert_eq!(log[0], "sync");
    assert!(log.contains(&"slow-ok"));
}
