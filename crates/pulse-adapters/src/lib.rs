//! pulse-adapters: piezas concretas sobre el núcleo reactivo
//!
//! Este crate provee:
//! - Middleware listos para usar: `SourceStamp` (bus) anota el origen de cada
//!   emisión; `TrimStrings` (state) normaliza strings antes del commit.
//! - `FileSnapshotStore`: persistencia del sobre de snapshot en un archivo
//!   JSON (el espejo local del estado de sesión).
//!
//! Nota: el core sólo conoce payloads JSON neutros; aquí vive todo lo que
//! tiene opinión sobre su contenido o lo saca del proceso.

pub mod errors;
pub mod middleware;
pub mod snapshot_file;

pub use errors::AdapterError;
pub use middleware::{SourceStamp, TrimStrings};
pub use snapshot_file::FileSnapshotStore;
