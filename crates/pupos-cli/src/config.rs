//! Operator configuration – reads/writes `~/.pupos/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted operator preferences. Behavior state is never persisted; only
/// these tunables survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Nominal dance tempo in beats per minute.
    #[serde(default = "default_bpm")]
    pub bpm: u32,

    /// Phrase spoken on startup.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_bpm() -> u32 {
    100
}
fn default_greeting() -> String {
    "Hello, my name is Beipas!".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            greeting: default_greeting(),
        }
    }
}

/// Return the path to `~/.pupos/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".pupos").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `PUPOS_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `PUPOS_BPM` | `bpm` |
/// | `PUPOS_GREETING` | `greeting` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PUPOS_BPM")
        && let Ok(bpm) = v.parse::<u32>()
    {
        cfg.bpm = bpm;
    }
    if let Ok(v) = std::env::var("PUPOS_GREETING") {
        cfg.greeting = v;
    }
}

/// Save the config to disk, creating `~/.pupos/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_under_dot_pupos() {
        let path = config_path_for_home("/home/pup");
        assert_eq!(path, PathBuf::from("/home/pup/.pupos/config.toml"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        assert_eq!(load_from(&path).unwrap(), None);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            bpm: 120,
            greeting: "Woof".to_string(),
        };
        save_to(&cfg, &path).unwrap();
        let loaded = load_from(&path).unwrap().expect("config present");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "bpm = 90\n").unwrap();
        let loaded = load_from(&path).unwrap().expect("config present");
        assert_eq!(loaded.bpm, 90);
        assert_eq!(loaded.greeting, default_greeting());
    }

    #[test]
    fn garbage_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "bpm = \"not a number\"\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("parse"));
    }
}
