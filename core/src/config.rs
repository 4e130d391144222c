//! On-disk settings, stored as TOML in the platform config directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const APP_NAME: &str = "wardscry";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where raw snapshot dumps are written. `None` disables dumping.
    pub snapshot_directory: Option<PathBuf>,
    /// Where rolling log files go; defaults to the platform data dir.
    pub log_directory: Option<PathBuf>,
    /// Whether multikills request highlight captures.
    pub highlights_enabled: bool,
    /// Fixed seed for attribution tie-breaking. `None` seeds from entropy;
    /// set it to make a replay of the same dump fully reproducible.
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_directory: None,
            log_directory: None,
            highlights_enabled: true,
            rng_seed: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, CoreError> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn store(&self) -> Result<(), CoreError> {
        Ok(confy::store(APP_NAME, None, self)?)
    }

    pub fn config_path() -> Result<PathBuf, CoreError> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }

    /// Effective log directory, falling back to `<data dir>/wardscry/logs`.
    pub fn log_directory(&self) -> PathBuf {
        self.log_directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
                .join("logs")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.snapshot_directory.is_none());
        assert!(settings.highlights_enabled);
        assert!(settings.rng_seed.is_none());
        assert!(settings.log_directory().ends_with("logs"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str("rng_seed = 42").unwrap();
        assert_eq!(settings.rng_seed, Some(42));
        assert!(settings.highlights_enabled);
    }
}
