use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collection::DEFAULT_PALETTE;
use crate::timer::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

const MIN_TIMER_MINUTES: u64 = 1;
const MAX_TIMER_MINUTES: u64 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board background colors; board records store an index into this list.
    pub board_colors: Vec<String>,
    pub timer_work_minutes: u64,
    pub timer_break_minutes: u64,
    pub export_pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_colors: DEFAULT_PALETTE.iter().map(|color| color.to_string()).collect(),
            timer_work_minutes: DEFAULT_WORK_MINUTES,
            timer_break_minutes: DEFAULT_BREAK_MINUTES,
            export_pretty: true,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("corkboard");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid settings config file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    fn validate(&mut self) {
        self.timer_work_minutes = self
            .timer_work_minutes
            .clamp(MIN_TIMER_MINUTES, MAX_TIMER_MINUTES);
        self.timer_break_minutes = self
            .timer_break_minutes
            .clamp(MIN_TIMER_MINUTES, MAX_TIMER_MINUTES);

        self.board_colors.retain(|color| !color.trim().is_empty());
        if self.board_colors.is_empty() {
            warn!("settings config lists no board colors; falling back to defaults");
            self.board_colors = Settings::default().board_colors;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_file_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("corkboard").join("settings.toml")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.board_colors, vec!["#edeae1".to_string()]);
        assert_eq!(settings.timer_work_minutes, 25);
        assert_eq!(settings.timer_break_minutes, 5);
        assert!(settings.export_pretty);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = settings_file_path(&temp_dir);
        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_toml() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "timer_work_minutes = [invalid")
            .expect("failed to write malformed settings");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "timer_work_minutes = 50").expect("failed to write partial settings");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.timer_work_minutes, 50);
        assert_eq!(settings.timer_break_minutes, DEFAULT_BREAK_MINUTES);
        assert_eq!(settings.board_colors, Settings::default().board_colors);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = settings_file_path(&temp_dir);
        let mut expected = Settings {
            board_colors: vec!["#1b2651".to_string(), "#cd2028".to_string()],
            timer_work_minutes: 45,
            timer_break_minutes: 10,
            export_pretty: false,
        };
        expected.validate();

        expected
            .save_to_path(&path)
            .expect("failed to save settings for roundtrip test");
        let loaded = Settings::load_from_path(&path);

        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_validate_clamps_timer_minutes() {
        let mut settings = Settings {
            timer_work_minutes: 0,
            timer_break_minutes: u64::MAX,
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.timer_work_minutes, MIN_TIMER_MINUTES);
        assert_eq!(settings.timer_break_minutes, MAX_TIMER_MINUTES);
    }

    #[test]
    fn test_validate_restores_empty_palette() {
        let mut settings = Settings {
            board_colors: vec!["   ".to_string()],
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.board_colors, Settings::default().board_colors);
    }
}
