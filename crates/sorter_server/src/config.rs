//! Process configuration read from `SORTER_*` environment variables.
//!
//! Unset variables fall back to defaults; a variable that is set but does
//! not parse is a startup error rather than a silent default. Loading runs
//! before logging is up, so the keys that took defaults are kept on the
//! config and reported by [`ServerConfig::log_summary`].

use log::info;
use sorter_core::{HomingMode, DEFAULT_FANOUT_BUFFER};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rotating log files go here; stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub homing_delay: Duration,
    pub homing_mode: HomingMode,
    pub fanout_buffer: usize,
    /// Variables that were unset and took their default.
    pub defaults_applied: Vec<&'static str>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            db_path: PathBuf::from("database.db"),
            log_level: sorter_core::default_log_level().to_string(),
            log_dir: None,
            homing_delay: sorter_core::DEFAULT_HOMING_DELAY,
            homing_mode: HomingMode::default(),
            fanout_buffer: DEFAULT_FANOUT_BUFFER,
            defaults_applied: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut applied = Vec::new();
        let homing_delay_ms: u64 = try_load(
            &lookup,
            &mut applied,
            "SORTER_HOMING_DELAY_MS",
            defaults.homing_delay.as_millis() as u64,
        )?;

        Ok(Self {
            host: try_load(&lookup, &mut applied, "SORTER_HOST", defaults.host)?,
            port: try_load(&lookup, &mut applied, "SORTER_PORT", defaults.port)?,
            db_path: PathBuf::from(try_load(
                &lookup,
                &mut applied,
                "SORTER_DB_PATH",
                defaults.db_path.display().to_string(),
            )?),
            log_level: try_load(&lookup, &mut applied, "SORTER_LOG_LEVEL", defaults.log_level)?,
            log_dir: lookup_log_dir(&lookup, &mut applied),
            homing_delay: Duration::from_millis(homing_delay_ms),
            homing_mode: try_load(&lookup, &mut applied, "SORTER_HOMING_MODE", defaults.homing_mode)?,
            fanout_buffer: try_load(
                &lookup,
                &mut applied,
                "SORTER_FANOUT_BUFFER",
                defaults.fanout_buffer,
            )?,
            defaults_applied: applied,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Logs the effective configuration. Call once logging is initialized.
    pub fn log_summary(&self) {
        info!(
            "event=config_load module=server status=ok address={} db_path={} log_level={} homing_delay_ms={} homing_mode={} fanout_buffer={}",
            self.bind_address(),
            self.db_path.display(),
            self.log_level,
            self.homing_delay.as_millis(),
            self.homing_mode,
            self.fanout_buffer
        );
        for key in &self.defaults_applied {
            info!("event=config_load module=server status=default key={key}");
        }
    }
}

fn lookup_log_dir(
    lookup: &impl Fn(&str) -> Option<String>,
    applied: &mut Vec<&'static str>,
) -> Option<PathBuf> {
    let dir = lookup("SORTER_LOG_DIR")
        .map(|dir| dir.trim().to_string())
        .filter(|dir| !dir.is_empty());
    if dir.is_none() {
        applied.push("SORTER_LOG_DIR");
    }
    dir.map(PathBuf::from)
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    applied: &mut Vec<&'static str>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        applied.push(key);
        return Ok(default);
    };

    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}
