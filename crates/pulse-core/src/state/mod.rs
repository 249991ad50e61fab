//! State Manager: store reactivo clave-valor con suscripciones, claves
//! derivadas, historia para time travel y actualizaciones en lote.
//!
//! Rol en el núcleo:
//! - Fuente única de verdad del estado de sesión; los valores son JSON neutro.
//! - Cada cambio comprometido queda en una historia acotada que permite
//!   deshacer (`time_travel`) sin stack de redo.
//! - Un `ChangeNotifier` opcional publica los cambios en el `EventBus`; el
//!   manager funciona igual sin bus (notificador nulo).

mod computed;
mod history;
mod middleware;
mod notifier;
mod snapshot;
mod store;

pub use history::HistoryEntry;
pub use middleware::StateMiddleware;
pub use notifier::{BusNotifier, ChangeNotifier, NullNotifier, StateChange};
pub use snapshot::Snapshot;
pub use store::{ImportOptions, SetOptions, StateManager, SubscribeOptions, SubscriberId};
