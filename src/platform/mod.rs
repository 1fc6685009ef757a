// imgconv platform abstraction
// Resolves the per-user configuration directory on Windows, macOS, and Linux.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for imgconv.
///
/// - **Linux**: `~/.config/imgconv` (or `$XDG_CONFIG_HOME/imgconv`)
/// - **macOS**: `~/Library/Application Support/imgconv`
/// - **Windows**: `%APPDATA%/imgconv`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Default location of the persisted settings file.
pub fn default_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}
