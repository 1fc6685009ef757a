// imgconv state managers
// Managers own the conversion state and the surfaces that edit it: file selection, options, result.

pub mod image_state_manager;
pub mod object_url_registry;
pub mod options_editor;
pub mod result_manager;
pub mod upload_manager;
