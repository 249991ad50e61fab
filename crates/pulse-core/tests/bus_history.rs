//! Historia del bus: cota FIFO, filtro por nombre y límite de consulta.

use pulse_core::EventBus;
use serde_json::json;

#[test]
fn history_is_bounded_fifo() {
    let mut bus = EventBus::with_history_capacity(5);
    for i in 0..8 {
        bus.dispatch("tick", json!({"seq": i})).detach();
    }

    assert_eq!(bus.history_len(), 5);
    let history = bus.history(None, 100);
    assert_eq!(history.len(), 5);
    // sobreviven los más recientes; el más antiguo primero
    assert_eq!(history[0].data["seq"], json!(3));
    assert_eq!(history[4].data["seq"], json!(7));
}

#[test]
fn history_filters_by_event_name() {
    let mut bus = EventBus::new();
    bus.dispatch("a", json!({})).detach();
    bus.dispatch("b", json!({})).detach();
    bus.dispatch("a", json!({})).detach();

    assert_eq!(bus.history(Some("a"), 100).len(), 2);
    assert_eq!(bus.history(Some("b"), 100).len(), 1);
    assert_eq!(bus.history(Some("missing"), 100).len(), 0);
    assert_eq!(bus.history(None, 100).len(), 3);
}

#[test]
fn history_limit_keeps_the_most_recent() {
    let mut bus = EventBus::new();
    for i in 0..10 {
        bus.dispatch("tick", json!({"seq": i})).detach();
    }

    let recent = bus.history(Some("tick"), 3);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].data["seq"], json!(7));
    assert_eq!(recent[2].data["seq"], json!(9));

    // consultar no muta la historia
    assert_eq!(bus.history_len(), 10);
}

#[test]
fn clear_drops_everything() {
    let mut bus = EventBus::new();
    bus.subscribe("evt", |_r| pulse_core::done());
    bus.dispatch("evt", json!({})).detach();

    bus.clear();
    assert_eq!(bus.listener_count("evt"), 0);
    assert_eq!(bus.history_len(), 0);
}
