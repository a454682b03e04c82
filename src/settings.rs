//! Runtime settings for the poolwatch binary.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `POOLWATCH_*` environment variables (nested keys use `__`), and finally
//! command-line overrides applied by the caller.
//!
//! ```toml
//! fetch_interval = "900ms"
//! tick_interval = "1s"
//! ticks = 10
//!
//! [[devices]]
//! id = "oic/kiln-1"
//! name = "Kiln"
//! temperature = 880.0
//!
//! [[devices]]
//! id = "oic/vat-2"
//! failing = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::duration::parse_interval;

pub const ENV_PREFIX: &str = "POOLWATCH";

const DEFAULT_TEMPERATURE: f64 = 20.0;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub fetch_interval: String,
    pub tick_interval: String,
    /// Number of ticks to publish before exiting; 0 runs until interrupted.
    pub ticks: u64,
    pub log_level: String,
    /// Also write the latest event to this file.
    pub output: Option<PathBuf>,
    /// Also send every event as a JSON line to this TCP address.
    pub tcp: Option<String>,
    /// Request a failure reset right after this tick.
    pub reset_after: Option<u64>,
    #[serde(default)]
    pub devices: Vec<DeviceSettings>,
}

/// A simulated device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceSettings {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub failing: bool,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl DeviceSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            temperature: DEFAULT_TEMPERATURE,
            failing: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("fetch_interval", "900ms")?
            .set_default("tick_interval", "1s")?
            .set_default("ticks", 0)?
            .set_default("log_level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load settings")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn fetch_interval(&self) -> Result<Duration> {
        parse_interval(&self.fetch_interval).context("Invalid fetch_interval")
    }

    pub fn tick_interval(&self) -> Result<Duration> {
        parse_interval(&self.tick_interval).context("Invalid tick_interval")
    }

    /// Check the fields that cannot be checked by deserialization alone.
    pub fn validate(&self) -> Result<()> {
        self.fetch_interval()?;
        self.tick_interval()?;
        if let Some(device) = self.devices.iter().find(|d| d.id.is_empty()) {
            anyhow::bail!("Device with name {:?} has an empty id", device.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poolwatch.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None).unwrap();

        assert_eq!(settings.fetch_interval().unwrap(), Duration::from_millis(900));
        assert!(settings.devices.is_empty());
        assert_eq!(settings.reset_after, None);
        assert_eq!(settings.tcp, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let (_dir, path) = write_config(
            r#"
            fetch_interval = "250ms"
            ticks = 4
            reset_after = 2
            tcp = "127.0.0.1:7878"

            [[devices]]
            id = "oic/kiln-1"
            name = "Kiln"
            temperature = 880.0

            [[devices]]
            id = "oic/vat-2"
            failing = true
            "#,
        );

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.fetch_interval().unwrap(), Duration::from_millis(250));
        assert_eq!(settings.ticks, 4);
        assert_eq!(settings.reset_after, Some(2));
        assert_eq!(settings.tcp.as_deref(), Some("127.0.0.1:7878"));
        assert_eq!(settings.devices.len(), 2);
        assert_eq!(settings.devices[0].name.as_deref(), Some("Kiln"));

        let vat = &settings.devices[1];
        assert!(vat.failing);
        assert_eq!(vat.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let (_dir, path) = write_config(r#"tick_interval = "0s""#);
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn empty_device_id_is_rejected() {
        let (_dir, path) = write_config(
            r#"
            [[devices]]
            id = ""
            "#,
        );
        assert!(Settings::load(Some(&path)).is_err());
    }
}
