use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::ConfigError;
use crate::core::input::SwipeConfig;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "minihub.toml";

/// Top-level configuration, loaded from `minihub.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Where `store.json` and the log file live. Defaults to the
    /// platform data directory.
    pub data_dir: Option<PathBuf>,
    /// How often the shell redraws and pumps the scheduler.
    pub frame_rate_hz: u32,
    /// `tracing-subscriber` env-filter directive.
    pub log_filter: String,
    pub input: InputConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            frame_rate_hz: 60,
            log_filter: "info".to_string(),
            input: InputConfig::default(),
        }
    }
}

/// Swipe thresholds and the terminal cell size used to turn cell
/// coordinates into pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub swipe_max_duration_ms: u64,
    pub swipe_min_distance_px: f32,
    pub cell_width_px: f32,
    pub cell_height_px: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            swipe_max_duration_ms: 500,
            swipe_min_distance_px: 25.0,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        }
    }
}

impl InputConfig {
    pub fn swipe(&self) -> SwipeConfig {
        SwipeConfig {
            max_duration: Duration::from_millis(self.swipe_max_duration_ms),
            min_distance: self.swipe_min_distance_px,
        }
    }
}

impl HubConfig {
    /// Load config from `path`, or from `minihub.toml` if it exists, then
    /// apply env var overrides. An explicit path that cannot be read is an
    /// error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    HubConfig::default()
                }
            }
        };

        // Environment variable overrides
        if let Ok(dir) = std::env::var("MINIHUB_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(val) = std::env::var("MINIHUB_FRAME_RATE") {
            if let Ok(hz) = val.parse::<u32>() {
                config.frame_rate_hz = hz;
            }
        }
        if let Ok(filter) = std::env::var("MINIHUB_LOG") {
            if !filter.is_empty() {
                config.log_filter = filter;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate_hz == 0 || self.frame_rate_hz > 240 {
            return Err(ConfigError::Invalid(format!(
                "frame_rate_hz must be within 1..=240, got {}",
                self.frame_rate_hz
            )));
        }
        if self.input.swipe_max_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "input.swipe_max_duration_ms must be > 0".to_string(),
            ));
        }
        if self.input.swipe_min_distance_px < 0.0 {
            return Err(ConfigError::Invalid(
                "input.swipe_min_distance_px must not be negative".to_string(),
            ));
        }
        if self.input.cell_width_px <= 0.0 || self.input.cell_height_px <= 0.0 {
            return Err(ConfigError::Invalid(
                "input cell sizes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_rate_hz.max(1)))
    }

    /// Resolved data directory: configured, else `<platform data dir>/minihub`,
    /// else `./.minihub`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("minihub"))
                .unwrap_or_else(|| PathBuf::from(".minihub"))
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("store.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("minihub.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.frame_rate_hz, 60);
        assert_eq!(cfg.log_filter, "info");
        assert!(cfg.data_dir.is_none());
        assert_eq!(cfg.input.swipe_max_duration_ms, 500);
        assert!((cfg.input.swipe_min_distance_px - 25.0).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
data_dir = "/tmp/minihub"
frame_rate_hz = 30
log_filter = "minihub=debug"

[input]
swipe_max_duration_ms = 400
swipe_min_distance_px = 12.5
cell_width_px = 10.0
cell_height_px = 20.0
"#;
        let cfg: HubConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/minihub")));
        assert_eq!(cfg.frame_rate_hz, 30);
        assert_eq!(cfg.log_filter, "minihub=debug");
        assert_eq!(cfg.input.swipe_max_duration_ms, 400);
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/minihub/store.json"));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: HubConfig = toml::from_str("frame_rate_hz = 24").unwrap();
        assert_eq!(cfg.frame_rate_hz, 24);
        assert_eq!(cfg.input.swipe_max_duration_ms, 500);
    }

    #[test]
    fn validate_rejects_zero_frame_rate() {
        let cfg = HubConfig {
            frame_rate_hz: 0,
            ..HubConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = HubConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn frame_period_follows_rate() {
        let cfg = HubConfig {
            frame_rate_hz: 50,
            ..HubConfig::default()
        };
        assert_eq!(cfg.frame_period(), Duration::from_millis(20));
    }
}
