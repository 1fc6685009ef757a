//! Unit tests for the ThemeEngine: defaults, toggling, persistence and observers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use imgconv::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use imgconv::services::theme_engine::{
    MemoryThemeStorage, ThemeAttribute, ThemeEngine, ThemeEngineTrait, ThemeStorage,
};
use imgconv::types::errors::SettingsError;
use imgconv::types::settings::Theme;
use tempfile::TempDir;

/// Storage that fails every read and write.
struct BrokenStorage;

impl ThemeStorage for BrokenStorage {
    fn load_theme(&self) -> Result<Option<Theme>, SettingsError> {
        Err(SettingsError::IoError("unreadable".to_string()))
    }

    fn save_theme(&mut self, _theme: Theme) -> Result<(), SettingsError> {
        Err(SettingsError::IoError("read-only".to_string()))
    }
}

#[test]
fn test_starts_from_persisted_theme() {
    let engine = ThemeEngine::new(Box::new(MemoryThemeStorage::new(Some(Theme::Dark))));
    assert_eq!(engine.get_theme(), Theme::Dark);
}

#[test]
fn test_load_failure_falls_back_to_light() {
    let engine = ThemeEngine::new(Box::new(BrokenStorage));
    assert_eq!(engine.get_theme(), Theme::Light);
}

#[test]
fn test_save_failure_still_changes_theme() {
    let mut engine = ThemeEngine::new(Box::new(BrokenStorage));
    assert!(engine.toggle_theme().is_err());
    assert_eq!(engine.get_theme(), Theme::Dark);
}

#[test]
fn test_set_theme_is_idempotent() {
    let mut engine = ThemeEngine::in_memory();
    engine.set_theme(Theme::Dark).unwrap();
    engine.set_theme(Theme::Dark).unwrap();
    assert_eq!(engine.get_theme(), Theme::Dark);
}

#[test]
fn test_observers_called_on_every_change() {
    let mut engine = ThemeEngine::in_memory();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let calls = calls.clone();
        let seen = seen.clone();
        engine.subscribe(Box::new(move |theme| {
            calls.fetch_add(1, Ordering::SeqCst);
            seen.lock().unwrap().push(theme);
        }));
    }

    engine.toggle_theme().unwrap();
    engine.toggle_theme().unwrap();
    engine.set_theme(Theme::Light).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*seen.lock().unwrap(), vec![Theme::Dark, Theme::Light, Theme::Light]);
}

#[test]
fn test_attribute_mirrors_initial_and_later_values() {
    let mut engine = ThemeEngine::new(Box::new(MemoryThemeStorage::new(Some(Theme::Dark))));
    let attribute = ThemeAttribute::attach(&mut engine);
    assert_eq!(attribute.value(), "dark");

    engine.set_theme(Theme::Light).unwrap();
    assert_eq!(attribute.value(), "light");
}

#[test]
fn test_theme_persists_through_settings_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json").to_string_lossy().to_string();

    {
        let settings = Arc::new(Mutex::new(SettingsEngine::new(Some(path.clone()))));
        let mut engine = ThemeEngine::new(Box::new(settings));
        assert_eq!(engine.get_theme(), Theme::Light);
        engine.toggle_theme().unwrap();
    }

    let settings = Arc::new(Mutex::new(SettingsEngine::new(Some(path.clone()))));
    let engine = ThemeEngine::new(Box::new(settings.clone()));
    assert_eq!(engine.get_theme(), Theme::Dark);
    assert_eq!(
        settings.lock().unwrap().get_settings().appearance.theme,
        Theme::Dark
    );
}

#[test]
fn test_corrupt_settings_file_falls_back_to_light() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let settings = Arc::new(Mutex::new(SettingsEngine::new(Some(
        path.to_string_lossy().to_string(),
    ))));
    let engine = ThemeEngine::new(Box::new(settings));
    assert_eq!(engine.get_theme(), Theme::Light);
}
