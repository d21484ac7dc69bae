//! Settings persistence
//!
//! [`GameSettings`] is stored as JSON in `settings.json` under the user's
//! configuration directory. Missing or unreadable files fall back to
//! defaults so a broken file never prevents the game from starting; saving
//! is explicit (`--save-settings`).

use super::error::CoreResult;
use bevy::prelude::Resource;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// User preferences that shape a session
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Executable speaking the UCI line protocol
    pub engine_command: String,
    pub engine_args: Vec<String>,
    /// Engine skill level, 0 to 20
    pub difficulty: u8,
    /// Pause before the engine answers, in seconds
    pub dwell_seconds: f32,
    pub physics_substeps: u32,
    pub smoke_capacity: usize,
    /// `tracing` filter directive handed to the log plugin
    pub log_filter: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            engine_command: "stockfish".to_string(),
            engine_args: Vec::new(),
            difficulty: 5,
            dwell_seconds: crate::game::DEFAULT_DWELL_SECONDS,
            physics_substeps: crate::physics::DEFAULT_SUBSTEPS,
            smoke_capacity: crate::effects::DEFAULT_CAPACITY,
            log_filter: "info,wgpu=error,naga=warn".to_string(),
        }
    }
}

impl GameSettings {
    /// Replace values the game cannot run with by their defaults
    pub fn sanitized(mut self) -> Self {
        if !self.dwell_seconds.is_finite() || self.dwell_seconds < 0.0 {
            tracing::warn!(
                "[SETTINGS] Invalid dwell_seconds {}, using {}",
                self.dwell_seconds,
                crate::game::DEFAULT_DWELL_SECONDS
            );
            self.dwell_seconds = crate::game::DEFAULT_DWELL_SECONDS;
        }
        self
    }
}

/// Resolve the settings file path
///
/// Returns `settings.json` in the user's configuration directory, or in the
/// working directory if the platform has none.
pub fn default_settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "shatterchess", "ShatterChess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Strict read; errors are left to the caller
pub fn read_settings(path: &Path) -> CoreResult<GameSettings> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load settings, falling back to defaults on any failure
pub fn load_settings(path: &Path) -> GameSettings {
    if !path.exists() {
        tracing::info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return GameSettings::default();
    }

    match read_settings(path) {
        Ok(settings) => {
            tracing::info!("[SETTINGS] Loaded settings from {:?}", path);
            settings.sanitized()
        }
        Err(e) => {
            tracing::warn!(
                "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                path,
                e
            );
            GameSettings::default()
        }
    }
}

/// Write settings as pretty JSON, creating parent directories as needed
pub fn save_settings(path: &Path, settings: &GameSettings) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    tracing::info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CoreError;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "shatterchess-settings-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        assert_eq!(load_settings(&dir.join("settings.json")), GameSettings::default());
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join("settings.json");
        let settings = GameSettings {
            engine_command: "/usr/games/stockfish".to_string(),
            difficulty: 12,
            ..GameSettings::default()
        };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(&path, r#"{ "difficulty": 3 }"#).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.difficulty, 3);
        assert_eq!(settings.engine_command, "stockfish");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_negative_dwell_falls_back_to_default() {
        let dir = scratch_dir("dwell");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(&path, r#"{ "dwell_seconds": -2.5, "difficulty": 9 }"#).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.dwell_seconds, crate::game::DEFAULT_DWELL_SECONDS);
        assert_eq!(settings.difficulty, 9);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_non_finite_dwell_is_replaced() {
        for dwell in [f32::NAN, f32::INFINITY] {
            let settings = GameSettings {
                dwell_seconds: dwell,
                ..GameSettings::default()
            }
            .sanitized();
            assert_eq!(settings.dwell_seconds, crate::game::DEFAULT_DWELL_SECONDS);
        }

        let zero = GameSettings {
            dwell_seconds: 0.0,
            ..GameSettings::default()
        };
        assert_eq!(zero.clone().sanitized(), zero);
    }

    #[test]
    fn test_corrupt_file_is_an_error_when_read_strictly() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_settings(&path),
            Err(CoreError::SettingsSerialization(_))
        ));
        assert_eq!(load_settings(&path), GameSettings::default());
        let _ = fs::remove_dir_all(&dir);
    }
}
