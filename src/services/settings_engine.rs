// imgconv Settings Engine
// Loads, saves and updates the persisted settings file, and stores the theme.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::platform;
use crate::services::theme_engine::ThemeStorage;
use crate::types::errors::SettingsError;
use crate::types::settings::{ConverterSettings, Theme};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ConverterSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ConverterSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine persisting `ConverterSettings` as JSON on disk.
#[derive(Debug)]
pub struct SettingsEngine {
    config_path: String,
    settings: ConverterSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// Without `path_override` the file is `settings.json` in the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::default_settings_path()
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: ConverterSettings::default(),
        }
    }

    /// Directory converted images are saved into, when configured.
    pub fn download_dir(&self) -> Option<&str> {
        self.settings
            .general
            .download_dir
            .as_deref()
            .filter(|d| !d.is_empty())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from disk. A missing file yields the defaults.
    fn load(&mut self) -> Result<ConverterSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = ConverterSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Updates one setting by dot-separated key (`"appearance.theme"`,
    /// `"general.download_dir"`), validates by deserializing, then saves.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| SettingsError::InvalidKey("Key cannot be empty".to_string()))?;

        let mut current = &mut json_value;
        for part in parents {
            current = current.get_mut(*part).ok_or_else(|| {
                SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
            })?;
        }

        match current {
            serde_json::Value::Object(map) if map.contains_key(*last) => {
                map.insert(last.to_string(), value);
            }
            serde_json::Value::Object(_) => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )));
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )));
            }
        }

        self.settings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.save()
    }

    /// Restores the defaults and saves them.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ConverterSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

/// The theme lives under `appearance.theme` in the settings file.
impl ThemeStorage for Arc<Mutex<SettingsEngine>> {
    fn load_theme(&self) -> Result<Option<Theme>, SettingsError> {
        let mut engine = self.lock().unwrap_or_else(PoisonError::into_inner);
        if !Path::new(engine.get_config_path()).exists() {
            return Ok(None);
        }
        Ok(Some(engine.load()?.appearance.theme))
    }

    fn save_theme(&mut self, theme: Theme) -> Result<(), SettingsError> {
        let mut engine = self.lock().unwrap_or_else(PoisonError::into_inner);
        engine.settings.appearance.theme = theme;
        engine.save()
    }
}
