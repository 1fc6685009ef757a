// imgconv services
// Services talk to the outside world: the conversion backend, the settings file, the theme.

pub mod conversion_orchestrator;
pub mod image_service;
pub mod settings_engine;
pub mod theme_engine;
