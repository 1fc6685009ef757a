// imgconv shared type definitions
// Each submodule defines types used across the application.

pub mod conversion;
pub mod errors;
pub mod file;
pub mod options;
pub mod progress;
pub mod settings;
