//! App Core for imgconv.
//!
//! Central struct wiring the shared conversion state to the surfaces, the
//! conversion orchestrator, the settings file and the theme.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ServiceConfig;
use crate::managers::image_state_manager::SharedImageState;
use crate::managers::object_url_registry::ObjectUrlRegistry;
use crate::managers::options_editor::OptionsEditor;
use crate::managers::result_manager::{ResultManager, ResultManagerTrait};
use crate::managers::upload_manager::UploadManager;
use crate::services::conversion_orchestrator::ConversionOrchestrator;
use crate::services::image_service::ImageService;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::theme_engine::{ThemeAttribute, ThemeEngine};
use crate::types::errors::ResultError;

/// Central application struct holding all managers and services.
///
/// Every surface shares one `SharedImageState`; the mutable surfaces sit
/// behind their own locks so RPC requests can run concurrently.
pub struct App {
    pub config: ServiceConfig,
    pub registry: ObjectUrlRegistry,
    pub state: SharedImageState,
    pub upload_manager: Mutex<UploadManager>,
    pub options_editor: OptionsEditor,
    pub result_manager: ResultManager,
    pub settings_engine: Arc<Mutex<SettingsEngine>>,
    pub theme_engine: Mutex<ThemeEngine>,
    pub theme_attribute: ThemeAttribute,
    pub orchestrator: ConversionOrchestrator<ImageService>,
}

impl App {
    /// Creates the app. `settings_path` overrides the platform settings file.
    ///
    /// A settings file that cannot be read is logged and replaced by defaults.
    pub fn new(
        config: ServiceConfig,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let registry = ObjectUrlRegistry::new();
        let state = SharedImageState::new();

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            log::warn!("Using default settings: {}", e);
        }
        let settings_engine = Arc::new(Mutex::new(settings_engine));

        let mut theme_engine = ThemeEngine::new(Box::new(settings_engine.clone()));
        let theme_attribute = ThemeAttribute::attach(&mut theme_engine);

        let service = ImageService::new(config.clone(), registry.clone())
            .map_err(|e| format!("HTTP client init failed: {}", e))?;
        let orchestrator =
            ConversionOrchestrator::new(service, state.clone(), registry.clone(), config.animation);

        log::debug!("App initialized against {}", config.base_url);

        Ok(Self {
            upload_manager: Mutex::new(UploadManager::new(state.clone(), registry.clone())),
            options_editor: OptionsEditor::new(state.clone()),
            result_manager: ResultManager::new(state.clone()),
            config,
            registry,
            state,
            settings_engine,
            theme_engine: Mutex::new(theme_engine),
            theme_attribute,
            orchestrator,
        })
    }

    pub fn uploads(&self) -> MutexGuard<'_, UploadManager> {
        self.upload_manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn themes(&self) -> MutexGuard<'_, ThemeEngine> {
        self.theme_engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves the converted image into `dir`, else the configured download
    /// directory, else next to the source file.
    pub fn save_result(&self, dir: Option<&Path>) -> Result<PathBuf, ResultError> {
        let configured = self.settings().download_dir().map(PathBuf::from);
        let target = dir.map(Path::to_path_buf).or(configured);
        self.result_manager.save_result(target.as_deref())
    }
}
