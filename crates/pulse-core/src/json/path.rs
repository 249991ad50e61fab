//! Lectura de campos anidados por ruta con puntos (`"a.b.c"`).
//!
//! Sólo lectura: la escritura anidada no existe (un `set("a.b", ...)` crea la
//! clave literal `"a.b"`, no modifica el objeto bajo `"a"`).

use serde_json::Value;

/// Recorre `root` siguiendo los segmentos separados por `.`; devuelve `None`
/// en cuanto un segmento no existe o el valor intermedio no es un objeto.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_nested_objects() {
        let root = json!({"user": {"profile": {"name": "Lina"}}});
        assert_eq!(get_path(&root, "user.profile.name"), Some(&json!("Lina")));
    }

    #[test]
    fn missing_segment_is_none() {
        let root = json!({"user": {"profile": {}}});
        assert_eq!(get_path(&root, "user.profile.name"), None);
        assert_eq!(get_path(&root, "user.settings.theme"), None);
    }

    #[test]
    fn non_object_intermediate_is_none() {
        let root = json!({"user": 42});
        assert_eq!(get_path(&root, "user.profile"), None);
    }
}
