//! Middleware de estado: reescritura de valores antes del commit.
//!
//! Se aplica en orden de registro sobre `(key, value, previous)` antes del
//! chequeo de igualdad estructural; puede normalizar o reescribir el valor
//! entrante. A diferencia del middleware del bus, no cancela: siempre
//! devuelve un valor.

use serde_json::Value;

pub trait StateMiddleware: Send + Sync {
    /// Devuelve el valor que se intentará comprometer bajo `key`.
    /// Implementaciones deben ser deterministas y sin efectos secundarios.
    fn transform(&self, key: &str, value: Value, previous: Option<&Value>) -> Value;
}

impl<F> StateMiddleware for F
    where F: Fn(&str, Value, Option<&Value>) -> Value + Send + Sync
{
    fn transform(&self, key: &str, value: Value, previous: Option<&Value>) -> Value {
        self(key, value, previous)
    }
}
