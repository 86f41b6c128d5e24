//! Reader preferences and the key-value store they persist to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store key the settings record lives under.
pub const SETTINGS_KEY: &str = "epubReaderSettings";

pub const DEFAULT_FONT_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Default,
    Inter,
    Poppins,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Default, FontFamily::Inter, FontFamily::Poppins];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::Default => "default",
            FontFamily::Inter => "inter",
            FontFamily::Poppins => "poppins",
        }
    }

    /// Class applied to the page content container.
    pub fn css_class(&self) -> &'static str {
        match self {
            FontFamily::Default => "font-default",
            FontFamily::Inter => "font-inter",
            FontFamily::Poppins => "font-poppins",
        }
    }
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font family '{}' (expected default, inter or poppins)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub font_family: FontFamily,
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Default,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Persistent key-value storage for JSON values.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Settings from the store, or defaults when absent or unreadable.
pub fn load_settings(store: &dyn SettingsStore) -> Settings {
    let value = match store.get(SETTINGS_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => return Settings::default(),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "cannot read settings store, using defaults");
            return Settings::default();
        }
    };

    match serde_json::from_value(value) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "stored settings are invalid, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &dyn SettingsStore, settings: &Settings) -> Result<()> {
    store.set(SETTINGS_KEY, serde_json::to_value(settings)?)?;
    tracing::debug!(font = %settings.font_family, size = settings.font_size, "settings saved");
    Ok(())
}

/// Holds the current settings and writes every change through to a store.
pub struct Preferences<S: SettingsStore> {
    store: S,
    settings: Settings,
}

impl<S: SettingsStore> Preferences<S> {
    /// Load the stored settings.
    pub fn load(store: S) -> Self {
        let settings = load_settings(&store);
        Self { store, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_font_family(&mut self, family: FontFamily) -> Result<()> {
        self.settings.font_family = family;
        save_settings(&self.store, &self.settings)
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        self.settings.font_size = size;
        save_settings(&self.store, &self.settings)
    }
}

/// A JSON object on disk, one member per key.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<serde_json::Map<String, Value>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read {}", self.path.display()));
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON object", self.path.display()))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        // A corrupt store is replaced rather than blocking every save.
        let mut all = self.read_all().unwrap_or_default();
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&Value::Object(all))?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Cannot write {}", self.path.display()))
    }
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.lock().map_err(|_| anyhow::anyhow!("store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow::anyhow!("store poisoned"))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_when_nothing_stored() {
        let store = MemoryStore::default();
        assert_eq!(load_settings(&store), Settings::default());
        assert_eq!(Settings::default().font_size, 16);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(Settings {
            font_family: FontFamily::Poppins,
            font_size: 18,
        })
        .unwrap();
        assert_eq!(value, json!({ "fontFamily": "poppins", "fontSize": 18 }));
    }

    #[test]
    fn test_invalid_stored_value_falls_back_to_defaults() {
        let store = MemoryStore::default();
        store
            .set(SETTINGS_KEY, json!({ "fontFamily": "comic-sans", "fontSize": 12 }))
            .unwrap();
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_font_change_is_saved_immediately() {
        let store = MemoryStore::default();
        let mut prefs = Preferences::load(&store);
        prefs.set_font_family(FontFamily::Inter).unwrap();

        assert_eq!(
            store.get(SETTINGS_KEY).unwrap(),
            Some(json!({ "fontFamily": "inter", "fontSize": 16 }))
        );
    }

    #[test]
    fn test_settings_persist_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut prefs = Preferences::load(JsonFileStore::new(&path));
        prefs.set_font_family(FontFamily::Poppins).unwrap();
        prefs.set_font_size(20).unwrap();

        let reloaded = Preferences::load(JsonFileStore::new(&path));
        assert_eq!(
            *reloaded.settings(),
            Settings {
                font_family: FontFamily::Poppins,
                font_size: 20
            }
        );
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"lastBook": "moby.epub"}"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path);
        save_settings(&store, &Settings::default()).unwrap();

        assert_eq!(store.get("lastBook").unwrap(), Some(json!("moby.epub")));
        assert!(store.get(SETTINGS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_settings(&JsonFileStore::new(&path)), Settings::default());
    }

    #[test]
    fn test_font_family_parsing() {
        assert_eq!("Inter".parse::<FontFamily>(), Ok(FontFamily::Inter));
        assert!("comic".parse::<FontFamily>().is_err());
        assert_eq!(FontFamily::Default.css_class(), "font-default");
    }
}
