//! Persistencia del sobre de snapshot en un archivo JSON.
//!
//! El espejo local del estado: `save` escribe el sobre tal como lo produce
//! `StateManager::export`; `load` devuelve el JSON crudo para que `import` lo
//! valide (la validación vive en el core, este adaptador nunca la puentea).

use std::fs;
use std::path::{Path, PathBuf};

use pulse_core::{ChangeNotifier, ImportOptions, Snapshot, StateManager};
use serde_json::Value;

use crate::errors::AdapterError;

pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Escribe el sobre como JSON legible. Crea los directorios intermedios
    /// si hace falta.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), AdapterError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, body)?;
        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    /// Lee el sobre crudo del disco sin validarlo.
    pub fn load(&self) -> Result<Value, AdapterError> {
        let body = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Atajo: export + save.
    pub fn save_from<N: ChangeNotifier>(&self, state: &StateManager<N>) -> Result<(), AdapterError> {
        self.save(&state.export(None))
    }

    /// Atajo: load + import (la validación del sobre la hace el core).
    pub fn restore_into<N: ChangeNotifier>(&self,
                                           state: &mut StateManager<N>,
                                           options: ImportOptions)
                                           -> Result<(), AdapterError> {
        let envelope = self.load()?;
        state.import(&envelope, options)?;
        Ok(())
    }
}
