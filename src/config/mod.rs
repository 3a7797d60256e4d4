use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::calculation::{check_cost_per_meal, check_tax_rate};
use crate::core::utils::{ensure_dir, PathResolver};
use crate::utils::DEFAULT_LOG_FILTER;

const TMP_SUFFIX: &str = "tmp";

pub const BIND_ENV: &str = "CATERING_BIND";
pub const TAX_RATE_ENV: &str = "CATERING_TAX_RATE";
pub const COST_PER_MEAL_ENV: &str = "CATERING_COST_PER_MEAL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server settings and report defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_bind_address")]
    pub bind_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for entity collections. Defaults to `<base>/data`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_tax_rate")]
    pub default_tax_rate: f64,
    #[serde(default = "Config::default_cost_per_meal")]
    pub default_cost_per_meal: f64,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            data_dir: None,
            default_tax_rate: Self::default_tax_rate(),
            default_cost_per_meal: Self::default_cost_per_meal(),
            backup_retention: Self::default_backup_retention(),
            log_filter: Self::default_log_filter(),
        }
    }
}

impl Config {
    pub fn default_bind_address() -> String {
        "127.0.0.1:8080".into()
    }

    pub fn default_tax_rate() -> f64 {
        0.18
    }

    pub fn default_cost_per_meal() -> f64 {
        25.0
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_log_filter() -> String {
        DEFAULT_LOG_FILTER.into()
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathResolver::data_dir_in(base))
    }

    /// Rejects report defaults that every request would otherwise fail on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems: Vec<String> = [
            check_tax_rate(self.default_tax_rate),
            check_cost_per_meal(self.default_cost_per_meal),
        ]
        .into_iter()
        .flatten()
        .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    /// Applies `CATERING_*` environment overrides. A numeric override that does
    /// not parse or is out of range is an error.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = lookup(BIND_ENV).filter(|value| !value.trim().is_empty()) {
            self.bind_address = bind.trim().to_string();
        }
        if let Some(raw) = lookup(TAX_RATE_ENV) {
            self.default_tax_rate = parse_override(TAX_RATE_ENV, &raw, check_tax_rate)?;
        }
        if let Some(raw) = lookup(COST_PER_MEAL_ENV) {
            self.default_cost_per_meal =
                parse_override(COST_PER_MEAL_ENV, &raw, check_cost_per_meal)?;
        }
        Ok(())
    }
}

/// Handles persistence of [`Config`] under the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn parse_override(
    key: &str,
    raw: &str,
    check: fn(f64) -> Option<String>,
) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}=`{raw}` is not a number")))?;
    match check(value) {
        Some(problem) => Err(ConfigError::Invalid(format!("{key}: {problem}"))),
        None => Ok(value),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_report_fallbacks() {
        let cfg = Config::default();
        assert_eq!(cfg.default_tax_rate, 0.18);
        assert_eq!(cfg.default_cost_per_meal, 25.0);
        assert!(!cfg.bind_address.is_empty());
    }

    #[test]
    fn manager_persists_and_loads_config() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        assert_eq!(manager.load().unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.default_tax_rate = 0.05;
        cfg.bind_address = "0.0.0.0:9000".into();
        manager.save(&cfg).expect("save config");

        let loaded = manager.load().expect("load config");
        assert_eq!(loaded, cfg);
        assert!(manager.path().ends_with("config/config.json"));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"default_cost_per_meal": 30}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_cost_per_meal, 30.0);
        assert_eq!(loaded.default_tax_rate, 0.18);
    }

    fn override_with(vars: &[(&str, &str)]) -> (Config, Result<(), ConfigError>) {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        let mut cfg = Config::default();
        let outcome = cfg.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));
        (cfg, outcome)
    }

    #[test]
    fn overrides_replace_defaults() {
        let (cfg, outcome) = override_with(&[
            (BIND_ENV, "0.0.0.0:7000"),
            (TAX_RATE_ENV, "0.12"),
            (COST_PER_MEAL_ENV, " 30 "),
        ]);
        outcome.expect("valid overrides");
        assert_eq!(cfg.bind_address, "0.0.0.0:7000");
        assert_eq!(cfg.default_tax_rate, 0.12);
        assert_eq!(cfg.default_cost_per_meal, 30.0);
    }

    #[test]
    fn unusable_numeric_overrides_are_rejected() {
        for (key, raw) in [
            (TAX_RATE_ENV, "NaN"),
            (TAX_RATE_ENV, "1.5"),
            (TAX_RATE_ENV, "-0.1"),
            (COST_PER_MEAL_ENV, "cheap"),
            (COST_PER_MEAL_ENV, "-4"),
            (COST_PER_MEAL_ENV, "inf"),
        ] {
            let (cfg, outcome) = override_with(&[(key, raw)]);
            let err = outcome.expect_err(raw);
            assert!(matches!(err, ConfigError::Invalid(_)), "{key}={raw}");
            assert!(cfg.validate().is_ok(), "defaults kept for {key}={raw}");
        }
    }

    #[test]
    fn load_rejects_out_of_range_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"default_tax_rate": 1.5}"#).unwrap();
        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("tax rate"), "{err}");
    }

    #[test]
    fn data_dir_defaults_under_base() {
        let cfg = Config::default();
        let base = PathBuf::from("/srv/catering");
        assert_eq!(cfg.resolve_data_dir(&base), base.join("data"));
    }
}
