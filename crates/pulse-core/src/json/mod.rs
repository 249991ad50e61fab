//! Utilidades JSON compartidas: merge shallow y lectura por ruta con puntos.

mod merge;
mod path;

pub use merge::merge_json;
pub use path::get_path;
