/// Location of the optional settings file.
///
///   - Windows: %APPDATA%\Timention\config.toml
///   - macOS:   ~/Library/Application Support/Timention/config.toml
///   - Linux:   $XDG_CONFIG_HOME/timention/config.toml (or ~/.config/…)
use std::path::PathBuf;

#[cfg(any(windows, target_os = "macos"))]
const APP_DIR_NAME: &str = "Timention";
#[cfg(not(any(windows, target_os = "macos")))]
const APP_DIR_NAME: &str = "timention";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the Timention config directory, or `None` when the platform
/// config directory cannot be determined (e.g. no home directory).
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Returns the full path to the config file.
pub fn config_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
