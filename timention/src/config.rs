use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::interval::{
    IntervalBounds, DEFAULT_INTERVAL_MINUTES, DEFAULT_MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES,
};
use crate::keys::DEFAULT_EXIT_KEY;

pub const DEFAULT_MESSAGE: &str = "Time to take a break!";
pub const DEFAULT_HINT: &str = "Press Esc to quit, any other key to get back to work";

/// Root configuration structure. Deserialized from the file at
/// [`crate::paths::config_file_path`].
///
/// The file is optional and only ever read. The interval the user accepts
/// at startup is not stored anywhere; `[prompt]` only shapes the prompt.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
    /// Register the executable to start at login (Windows only).
    #[serde(default)]
    pub launch_on_startup: bool,
}

/// Range and pre-filled value of the interval prompt, in minutes.
#[derive(Debug, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_min_minutes")]
    pub min_minutes: u32,
    /// Clamped to the hard ceiling of 2000.
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
    #[serde(default = "default_default_minutes")]
    pub default_minutes: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            min_minutes: MIN_INTERVAL_MINUTES,
            max_minutes: DEFAULT_MAX_INTERVAL_MINUTES,
            default_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl PromptConfig {
    /// Returns the effective bounds, with inconsistent values clamped.
    pub fn bounds(&self) -> IntervalBounds {
        IntervalBounds::clamped(self.min_minutes, self.max_minutes, self.default_minutes)
    }
}

/// What the overlay shows and which key ends the program.
#[derive(Debug, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_hint")]
    pub hint: String,
    /// Key name (e.g. "Escape", "Q", "F10").
    #[serde(default = "default_exit_key")]
    pub exit_key: String,
    #[serde(default = "default_bell")]
    pub bell: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_string(),
            hint: DEFAULT_HINT.to_string(),
            exit_key: DEFAULT_EXIT_KEY.to_string(),
            bell: true,
        }
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_min_minutes() -> u32 {
    MIN_INTERVAL_MINUTES
}

fn default_max_minutes() -> u32 {
    DEFAULT_MAX_INTERVAL_MINUTES
}

fn default_default_minutes() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

fn default_hint() -> String {
    DEFAULT_HINT.to_string()
}

fn default_exit_key() -> String {
    DEFAULT_EXIT_KEY.to_string()
}

fn default_bell() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::MAX_INTERVAL_CEILING_MINUTES;

    fn prompt(min: u32, max: u32, default: u32) -> PromptConfig {
        PromptConfig {
            min_minutes: min,
            max_minutes: max,
            default_minutes: default,
        }
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn prompt_config_default_values() {
        let p = PromptConfig::default();
        assert_eq!(p.min_minutes, 1);
        assert_eq!(p.max_minutes, 1440);
        assert_eq!(p.default_minutes, 20);
    }

    #[test]
    fn reminder_config_default_values() {
        let r = ReminderConfig::default();
        assert_eq!(r.message, DEFAULT_MESSAGE);
        assert_eq!(r.hint, DEFAULT_HINT);
        assert_eq!(r.exit_key, "Escape");
        assert!(r.bell);
    }

    #[test]
    fn config_default_does_not_launch_on_startup() {
        assert!(!Config::default().launch_on_startup);
    }

    // ── bounds ────────────────────────────────────────────────────────────────

    #[test]
    fn bounds_pass_through_valid_values() {
        let b = prompt(5, 120, 25).bounds();
        assert_eq!((b.min(), b.max(), b.default_minutes()), (5, 120, 25));
    }

    #[test]
    fn bounds_clamp_zero_min() {
        assert_eq!(prompt(0, 60, 10).bounds().min(), 1);
    }

    #[test]
    fn bounds_clamp_max_to_ceiling() {
        assert_eq!(prompt(1, 99_999, 10).bounds().max(), MAX_INTERVAL_CEILING_MINUTES);
    }

    #[test]
    fn bounds_clamp_default_into_range() {
        assert_eq!(prompt(10, 60, 5).bounds().default_minutes(), 10);
        assert_eq!(prompt(10, 60, 500).bounds().default_minutes(), 60);
    }

    // ── load_or_default ───────────────────────────────────────────────────────

    #[test]
    fn load_or_default_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let config = load_or_default(&path).unwrap();
        assert_eq!(config.prompt.default_minutes, DEFAULT_INTERVAL_MINUTES);
        assert_eq!(config.reminder.exit_key, DEFAULT_EXIT_KEY);
    }

    #[test]
    fn load_or_default_parses_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
launch_on_startup = true

[prompt]
min_minutes = 5
max_minutes = 2000
default_minutes = 45

[reminder]
message = "Drink some water"
hint = "Q quits"
exit_key = "Q"
bell = false
"#,
        )
        .unwrap();

        let config = load_or_default(&path).unwrap();
        assert!(config.launch_on_startup);
        assert_eq!(config.prompt.min_minutes, 5);
        assert_eq!(config.prompt.max_minutes, 2000);
        assert_eq!(config.prompt.default_minutes, 45);
        assert_eq!(config.reminder.message, "Drink some water");
        assert_eq!(config.reminder.hint, "Q quits");
        assert_eq!(config.reminder.exit_key, "Q");
        assert!(!config.reminder.bell);
    }

    #[test]
    fn load_or_default_partial_toml_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[prompt]\ndefault_minutes = 30\n").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.prompt.default_minutes, 30);
        assert_eq!(config.prompt.min_minutes, MIN_INTERVAL_MINUTES);
        assert_eq!(config.prompt.max_minutes, DEFAULT_MAX_INTERVAL_MINUTES);
        assert_eq!(config.reminder.message, DEFAULT_MESSAGE);
        assert!(config.reminder.bell);
        assert!(!config.launch_on_startup);
    }

    #[test]
    fn load_or_default_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.prompt.bounds(), IntervalBounds::default());
    }

    #[test]
    fn load_or_default_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not valid toml ][[[").unwrap();
        assert!(load_or_default(&path).is_err());
    }

    #[test]
    fn load_or_default_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[prompt]\nmax_minutes = \"lots\"\n").unwrap();
        assert!(load_or_default(&path).is_err());
    }

    #[test]
    fn load_or_default_negative_minutes_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[prompt]\nmin_minutes = -1\n").unwrap();
        assert!(load_or_default(&path).is_err());
    }
}
