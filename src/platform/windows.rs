// imgconv platform paths for Windows
// Config: %APPDATA%/imgconv

use std::env;
use std::path::PathBuf;

/// Returns the configuration directory for imgconv on Windows.
/// `%APPDATA%/imgconv`
pub fn get_config_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("imgconv")
}
