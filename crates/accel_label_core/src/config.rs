//! Application configuration.
//!
//! # Responsibility
//! - Collect the data-root path and tunables from the environment.
//! - Validate values before any component is built from them.
//!
//! # Invariants
//! - `data_root` is always set; there is no implicit default location.
//! - `decimation` is at least 1.

use crate::figure::DEFAULT_DECIMATION;
use crate::logging::default_log_level;
use crate::time::DEFAULT_UTC_OFFSET_HOURS;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATA_PATH: &str = "ACCEL_LABEL_DATA_PATH";
pub const ENV_DECIMATION: &str = "ACCEL_LABEL_DECIMATION";
pub const ENV_UTC_OFFSET_HOURS: &str = "ACCEL_LABEL_UTC_OFFSET_HOURS";
pub const ENV_LOG_LEVEL: &str = "ACCEL_LABEL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ACCEL_LABEL_LOG_DIR";

const DEFAULT_LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidValue {
        key: &'static str,
        value: String,
    },
    EmptyDataRoot,
    ZeroDecimation,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "environment variable `{key}` is not set"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
            Self::EmptyDataRoot => write!(f, "data root path cannot be empty"),
            Self::ZeroDecimation => write!(f, "decimation factor must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `0_raw` and `1_labeled`.
    pub data_root: PathBuf,
    /// Plot every Nth sample.
    pub decimation: usize,
    /// Hours subtracted from recording names to reach absolute time.
    pub utc_offset_hours: i64,
    pub log_level: String,
    /// Defaults to `<data_root>/logs`.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            decimation: DEFAULT_DECIMATION,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// - `MissingVar` when the data path is absent.
    /// - `InvalidValue` when a numeric variable does not parse.
    /// - Any error of [`AppConfig::validate`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_root = lookup(ENV_DATA_PATH).ok_or(ConfigError::MissingVar(ENV_DATA_PATH))?;
        let mut config = Self::new(data_root);

        if let Some(value) = lookup(ENV_DECIMATION) {
            config.decimation = parse_var(ENV_DECIMATION, &value)?;
        }
        if let Some(value) = lookup(ENV_UTC_OFFSET_HOURS) {
            config.utc_offset_hours = parse_var(ENV_UTC_OFFSET_HOURS, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(value));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataRoot);
        }
        if self.decimation == 0 {
            return Err(ConfigError::ZeroDecimation);
        }
        Ok(())
    }

    /// Absolute log directory, resolved against `cwd` when relative.
    pub fn resolved_log_dir(&self, cwd: &Path) -> PathBuf {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| self.data_root.join(DEFAULT_LOG_DIR_NAME));
        if dir.is_absolute() {
            dir
        } else {
            cwd.join(dir)
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DATA_PATH, ENV_DECIMATION, ENV_UTC_OFFSET_HOURS};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn data_path_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ENV_DATA_PATH));
    }

    #[test]
    fn defaults_apply_when_only_data_path_is_set() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DATA_PATH, "/data")])).unwrap();
        assert_eq!(config.data_root, PathBuf::from("/data"));
        assert_eq!(config.decimation, 25);
        assert_eq!(config.utc_offset_hours, 4);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn numeric_overrides_are_parsed_and_validated() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_PATH, "/data"),
            (ENV_DECIMATION, "10"),
            (ENV_UTC_OFFSET_HOURS, "-5"),
        ]))
        .unwrap();
        assert_eq!(config.decimation, 10);
        assert_eq!(config.utc_offset_hours, -5);

        let zero = AppConfig::from_lookup(lookup(&[(ENV_DATA_PATH, "/data"), (ENV_DECIMATION, "0")]));
        assert_eq!(zero.unwrap_err(), ConfigError::ZeroDecimation);

        let garbage =
            AppConfig::from_lookup(lookup(&[(ENV_DATA_PATH, "/data"), (ENV_DECIMATION, "many")]));
        assert!(matches!(garbage, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn log_dir_defaults_under_data_root() {
        let config = AppConfig::new("data");
        assert_eq!(
            config.resolved_log_dir(Path::new("/work")),
            PathBuf::from("/work/data/logs")
        );
    }
}
