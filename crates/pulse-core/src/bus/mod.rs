//! Event Bus: pub/sub en proceso con prioridades, middleware e historia.
//!
//! Rol en el núcleo:
//! - Desacopla productores de consumidores de eventos nombrados, con orden de
//!   despacho determinista (prioridad descendente, estable entre iguales).
//! - Cada emisión atraviesa un pipeline de middleware que puede transformar o
//!   cancelar el registro antes del despacho.
//! - Toda emisión (cancelada o no) queda en una historia FIFO acotada para
//!   replay y debugging.

mod core;
mod listener;
mod middleware;
mod record;

pub use core::{EmitOutcome, EventBus};
pub use listener::{defer, done, ListenerFuture, ListenerId, ListenerResult};
pub use middleware::{EventMiddleware, MiddlewareId};
pub use record::EventRecord;
