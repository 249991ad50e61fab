//! Merge "shallow" de valores JSON.
//!
//! Las claves de `b` reemplazan a las de `a` cuando ambos son objetos; no hay
//! recursión en objetos anidados. Cuando alguno de los dos no es objeto, `b`
//! tiene precedencia total. Esta es la semántica de `set` con `merge: true` y
//! de `update`.

use serde_json::Value;

/// Merge shallow: keys from `b` override keys from `a` when both are objects.
pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        // Non-objects: override
        (_, other) => other.clone(),
    }
}
