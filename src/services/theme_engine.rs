//! Theme Engine — holds the light/dark theme, persists it and notifies observers.

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::errors::SettingsError;
use crate::types::settings::Theme;

/// Where the theme is persisted between runs.
pub trait ThemeStorage {
    /// Returns the stored theme, or `None` when nothing was stored yet.
    fn load_theme(&self) -> Result<Option<Theme>, SettingsError>;
    fn save_theme(&mut self, theme: Theme) -> Result<(), SettingsError>;
}

/// Volatile storage, used when no settings file is wanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryThemeStorage {
    theme: Option<Theme>,
}

impl MemoryThemeStorage {
    pub fn new(theme: Option<Theme>) -> Self {
        Self { theme }
    }
}

impl ThemeStorage for MemoryThemeStorage {
    fn load_theme(&self) -> Result<Option<Theme>, SettingsError> {
        Ok(self.theme)
    }

    fn save_theme(&mut self, theme: Theme) -> Result<(), SettingsError> {
        self.theme = Some(theme);
        Ok(())
    }
}

pub type ThemeObserver = Box<dyn Fn(Theme) + Send + Sync>;

/// Trait defining the theme engine interface.
pub trait ThemeEngineTrait {
    fn get_theme(&self) -> Theme;
    fn set_theme(&mut self, theme: Theme) -> Result<(), SettingsError>;
    fn toggle_theme(&mut self) -> Result<Theme, SettingsError>;
    fn subscribe(&mut self, observer: ThemeObserver);
}

/// The theme engine implementation.
pub struct ThemeEngine {
    theme: Theme,
    storage: Box<dyn ThemeStorage + Send>,
    observers: Vec<ThemeObserver>,
}

impl ThemeEngine {
    /// Creates the engine with the persisted theme, or `Light` when none can be read.
    pub fn new(storage: Box<dyn ThemeStorage + Send>) -> Self {
        let theme = match storage.load_theme() {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to load theme, using default: {}", e);
                Theme::default()
            }
        };

        Self {
            theme,
            storage,
            observers: Vec::new(),
        }
    }

    /// Engine without persistence.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryThemeStorage::default()))
    }
}

impl ThemeEngineTrait for ThemeEngine {
    fn get_theme(&self) -> Theme {
        self.theme
    }

    /// Changes the theme, notifies observers and persists it.
    ///
    /// The in-memory theme changes even when persisting fails.
    fn set_theme(&mut self, theme: Theme) -> Result<(), SettingsError> {
        self.theme = theme;
        for observer in &self.observers {
            observer(theme);
        }
        self.storage.save_theme(theme).map_err(|e| {
            log::warn!("Failed to persist theme {}: {}", theme, e);
            e
        })
    }

    fn toggle_theme(&mut self) -> Result<Theme, SettingsError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn subscribe(&mut self, observer: ThemeObserver) {
        self.observers.push(observer);
    }
}

/// Mirror of the document's `data-theme` attribute.
#[derive(Debug, Clone, Default)]
pub struct ThemeAttribute {
    value: Arc<Mutex<String>>,
}

impl ThemeAttribute {
    /// Creates the attribute and keeps it in sync with `engine`.
    pub fn attach(engine: &mut ThemeEngine) -> Self {
        let attribute = Self {
            value: Arc::new(Mutex::new(engine.get_theme().as_str().to_string())),
        };
        let value = attribute.value.clone();
        engine.subscribe(Box::new(move |theme| {
            *value.lock().unwrap_or_else(PoisonError::into_inner) = theme.as_str().to_string();
        }));
        attribute
    }

    pub fn value(&self) -> String {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
