use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{PERSISTENCE, settings_path};

/// Per-instrument user settings (indicator configuration, chart shape).
/// Values are opaque JSON; the session owns their schema.
pub trait UserSettingsStore: Send {
    fn load(&self, instrument_id: &str) -> Result<Option<Value>>;
    fn save(&mut self, instrument_id: &str, value: Value) -> Result<()>;
}

/// Store that forgets everything when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    entries: HashMap<String, Value>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserSettingsStore for MemorySettingsStore {
    fn load(&self, instrument_id: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(instrument_id).cloned())
    }

    fn save(&mut self, instrument_id: &str, value: Value) -> Result<()> {
        self.entries.insert(instrument_id.to_string(), value);
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct SettingsDocument {
    version: u32,
    #[serde(default)]
    instruments: BTreeMap<String, Value>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            version: PERSISTENCE.settings.version,
            instruments: BTreeMap::new(),
        }
    }
}

/// Every instrument's settings in one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `.chart_state/chart_settings.json` under the working directory.
    pub fn at_default_location() -> Self {
        Self::new(settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<SettingsDocument> {
        if !self.path.exists() {
            return Ok(SettingsDocument::default());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let doc: SettingsDocument = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        if doc.version != PERSISTENCE.settings.version {
            log::warn!(
                "Ignoring settings file {} (version {}, expected {})",
                self.path.display(),
                doc.version,
                PERSISTENCE.settings.version
            );
            return Ok(SettingsDocument::default());
        }
        Ok(doc)
    }

    fn write_document(&self, doc: &SettingsDocument) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), doc)?;
        Ok(())
    }
}

impl UserSettingsStore for JsonFileSettingsStore {
    fn load(&self, instrument_id: &str) -> Result<Option<Value>> {
        Ok(self.read_document()?.instruments.remove(instrument_id))
    }

    fn save(&mut self, instrument_id: &str, value: Value) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.instruments.insert(instrument_id.to_string(), value);
        self.write_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("instrument_chart_{}_{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemorySettingsStore::new();
        assert_eq!(store.load("ACME").unwrap(), None);
        store.save("ACME", json!({"chart_type": "ohlc"})).unwrap();
        assert_eq!(store.load("ACME").unwrap(), Some(json!({"chart_type": "ohlc"})));
    }

    #[test]
    fn file_store_keeps_other_instruments() {
        let path = scratch_path("keeps_others");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileSettingsStore::new(&path);
        store.save("ACME", json!({"a": 1})).unwrap();
        store.save("BETA", json!({"b": 2})).unwrap();

        let reopened = JsonFileSettingsStore::new(&path);
        assert_eq!(reopened.load("ACME").unwrap(), Some(json!({"a": 1})));
        assert_eq!(reopened.load("BETA").unwrap(), Some(json!({"b": 2})));
        assert_eq!(reopened.load("GAMMA").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_ignores_other_versions() {
        let path = scratch_path("versions");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"version": 999, "instruments": {"ACME": {"a": 1}}}"#).unwrap();

        let store = JsonFileSettingsStore::new(&path);
        assert_eq!(store.load("ACME").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
