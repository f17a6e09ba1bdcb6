//! Runtime configuration for the command-line front end.
//!
//! Settings come from built-in defaults, an optional `shiftplan.toml`, the
//! `.env` file and `SHIFTPLAN_*` environment variables.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::calendar;

/// Runtime settings for the command-line front end.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Default shift window offered by the replication prompt.
    pub default_start_time: String,
    pub default_end_time: String,
    /// Load the sample hospitals, groups and professionals at startup.
    pub seed_directory: bool,
}

impl Settings {
    /// ## Summary
    /// Loads settings from defaults, an optional `shiftplan.toml`, the `.env`
    /// file and `SHIFTPLAN_*` environment variables, later sources winning.
    ///
    /// ## Errors
    /// Returns an error if a source cannot be read, deserialization fails,
    /// or a default shift time is not a valid `HH:MM` time.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some("shiftplan"))
    }

    fn from_sources(file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("log_level", "info")?
            .set_default("default_start_time", "07:00")?
            .set_default("default_end_time", "19:00")?
            .set_default("seed_directory", true)?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("SHIFTPLAN").try_parsing(true))
            .build()?
            .try_deserialize()?;

        calendar::parse_time_of_day("default_start_time", &settings.default_start_time)?;
        calendar::parse_time_of_day("default_end_time", &settings.default_end_time)?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_defaults_without_sources() {
        let settings = Settings::from_sources(None).unwrap();

        tracing::debug!(?settings, "Loaded default settings");
        assert_eq!(settings.default_start_time, "07:00");
        assert_eq!(settings.default_end_time, "19:00");
        assert!(settings.seed_directory);
    }

    #[test]
    fn test_settings_clone() {
        let settings = Settings {
            log_level: "debug".to_string(),
            default_start_time: "19:00".to_string(),
            default_end_time: "23:00".to_string(),
            seed_directory: false,
        };

        let cloned = settings.clone();
        assert_eq!(cloned.log_level, settings.log_level);
        assert!(!cloned.seed_directory);
    }
}
