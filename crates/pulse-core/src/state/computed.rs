//! Bindings de claves derivadas (computed).
//!
//! Un binding declara sus dependencias por nombre; cuando cualquiera de ellas
//! compromete un cambio, la cache se invalida y el valor se recalcula de
//! forma síncrona y eager (aunque nadie esté suscrito a la clave derivada).

use std::sync::Arc;

use serde_json::Value;

pub(crate) type ComputeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

pub(crate) struct ComputedBinding {
    pub key: String,
    pub deps: Vec<String>,
    pub compute: ComputeFn,
    /// Último valor calculado; `None` cuando la cache fue invalidada y aún no
    /// se recalculó.
    pub cached: Option<Value>,
}

impl ComputedBinding {
    pub fn depends_on(&self, key: &str) -> bool {
        self.deps.iter().any(|d| d == key)
    }
}
