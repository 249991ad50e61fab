//! Pulse Rust Library
//!
//! Crate paraguas del workspace: re-exporta el núcleo reactivo
//! (`pulse-core`) y los adaptadores (`pulse-adapters`) para que los clientes
//! dependan de un único crate. Puede usarse desde `main.rs` o por otros
//! crates/clientes.

pub use pulse_adapters as adapters;
pub use pulse_core::*;
