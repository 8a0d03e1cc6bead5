//! Process configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use tallyscan_scanner::{IdleTimeouts, KeyMap, TerminatorKey, UnknownTerminatorKey};

pub const LOCATION_IDLE_MS: &str = "TALLYSCAN_LOCATION_IDLE_MS";
pub const ITEM_IDLE_MS: &str = "TALLYSCAN_ITEM_IDLE_MS";
pub const FINISHED_IDLE_MS: &str = "TALLYSCAN_FINISHED_IDLE_MS";
pub const TERMINATORS: &str = "TALLYSCAN_TERMINATORS";
pub const DEMO_MARKER: &str = "TALLYSCAN_DEMO_MARKER";
pub const DB_PATH: &str = "TALLYSCAN_DB";

const DEFAULT_DEMO_MARKER: &str = "DEMO";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected milliseconds, `0` or `off`, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var}: {source}")]
    InvalidTerminator {
        var: &'static str,
        #[source]
        source: UnknownTerminatorKey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub idle_timeouts: IdleTimeouts,
    /// Empty: the scanner sends no terminator and only idle timeouts end a
    /// scan.
    pub terminators: Vec<TerminatorKey>,
    pub demo_marker: Option<String>,
    /// `None` keeps lines in memory for the lifetime of the process.
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            idle_timeouts: IdleTimeouts::default(),
            terminators: vec![TerminatorKey::Enter, TerminatorKey::Tab],
            demo_marker: Some(DEFAULT_DEMO_MARKER.to_string()),
            db_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset or blank variables keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let idle_timeouts = IdleTimeouts {
            awaiting_location: timeout(
                LOCATION_IDLE_MS,
                get(LOCATION_IDLE_MS),
                defaults.idle_timeouts.awaiting_location,
            )?,
            awaiting_items: timeout(
                ITEM_IDLE_MS,
                get(ITEM_IDLE_MS),
                defaults.idle_timeouts.awaiting_items,
            )?,
            finished: timeout(
                FINISHED_IDLE_MS,
                get(FINISHED_IDLE_MS),
                defaults.idle_timeouts.finished,
            )?,
        };

        let terminators = match get(TERMINATORS) {
            None => defaults.terminators,
            Some(v) if v.eq_ignore_ascii_case("none") => Vec::new(),
            Some(v) => v
                .split(',')
                .filter(|k| !k.trim().is_empty())
                .map(|k| k.parse::<TerminatorKey>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ConfigError::InvalidTerminator {
                    var: TERMINATORS,
                    source,
                })?,
        };

        let demo_marker = match get(DEMO_MARKER) {
            None => defaults.demo_marker,
            Some(v) if v.eq_ignore_ascii_case("off") => None,
            Some(v) => Some(v),
        };

        let config = Self {
            idle_timeouts,
            terminators,
            demo_marker,
            db_path: get(DB_PATH).map(PathBuf::from),
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn key_map(&self) -> KeyMap {
        KeyMap::from_terminators(&self.terminators)
    }
}

fn timeout(
    var: &'static str,
    value: Option<String>,
    default: Option<Duration>,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    match value.parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(_) => Err(ConfigError::InvalidTimeout { var, value }),
    }
}
