//! JSON file store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a sibling temp file
//! first and are renamed into place, so a crash never leaves a half-written
//! document behind.

use std::path::{Path, PathBuf};

use chatgate_core::{AccessState, Error, PersistentStore, Result, StoredState};

/// Store that persists each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory the store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `key`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced with `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl PersistentStore for JsonFileStore {
    fn load(&self, key: &str, version: u32) -> Result<Option<AccessState>> {
        let path = self.path_for(key);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::store(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        log::debug!("Loaded access state from {}", path.display());
        Ok(StoredState::from_json(&json)?.into_state(version))
    }

    fn save(&self, key: &str, version: u32, state: &AccessState) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = StoredState::new(state.clone(), version).to_json()?;

        std::fs::write(&tmp, json)
            .map_err(|e| Error::store(format!("Failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| Error::store(format!("Failed to replace {}: {e}", path.display())))?;

        Ok(())
    }
}
