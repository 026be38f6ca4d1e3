//! Configuration service implementation.
//!
//! Loads the engine configuration from a TOML file
//! (~/.config/matchflow/config.toml by default), layers environment
//! overrides on top, and caches the result.

use crate::paths::MatchflowPaths;
use anyhow::Context;
use matchflow_core::config::MatchflowConfig;
use matchflow_core::error::{MatchflowError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_AUTH_FAILURE_THRESHOLD: &str = "MATCHFLOW_AUTH_FAILURE_THRESHOLD";
pub const ENV_RACE_WINDOW_SECS: &str = "MATCHFLOW_RACE_WINDOW_SECS";
pub const ENV_HISTORY_LIMIT: &str = "MATCHFLOW_HISTORY_LIMIT";

/// Configuration service that loads and caches the engine configuration.
///
/// A missing file yields the defaults. A malformed file or an invalid
/// override is reported as `MatchflowError::Config`.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file; `None` resolves the platform default on load
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<MatchflowConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the platform default config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it if not cached.
    pub fn get_config(&self) -> Result<MatchflowConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| MatchflowError::internal("Config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|_| MatchflowError::internal("Config cache lock poisoned"))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<MatchflowConfig> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => MatchflowPaths::config_file().map_err(|e| MatchflowError::config(e.to_string()))?,
        };

        let mut config = if path.exists() {
            read_config_file(&path).map_err(|e| MatchflowError::config(format!("{:#}", e)))?
        } else {
            tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
            MatchflowConfig::default()
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        validate(&config)?;

        tracing::debug!(
            "[ConfigService] Loaded config: threshold={}, race_window={}s, history_limit={}",
            config.resilience.auth_failure_threshold,
            config.promotion.race_window_secs,
            config.session.history_limit
        );
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<MatchflowConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Applies `MATCHFLOW_*` overrides looked up through `lookup`.
fn apply_env_overrides<F>(config: &mut MatchflowConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_AUTH_FAILURE_THRESHOLD) {
        config.resilience.auth_failure_threshold = parse_override(ENV_AUTH_FAILURE_THRESHOLD, &value)?;
    }
    if let Some(value) = lookup(ENV_RACE_WINDOW_SECS) {
        config.promotion.race_window_secs = parse_override(ENV_RACE_WINDOW_SECS, &value)?;
    }
    if let Some(value) = lookup(ENV_HISTORY_LIMIT) {
        config.session.history_limit = parse_override(ENV_HISTORY_LIMIT, &value)?;
    }
    Ok(())
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MatchflowError::config(format!("Invalid value for {}: '{}'", key, value)))
}

fn validate(config: &MatchflowConfig) -> Result<()> {
    if config.resilience.auth_failure_threshold == 0 {
        return Err(MatchflowError::config(
            "resilience.auth_failure_threshold must be at least 1",
        ));
    }
    if config.promotion.race_window_secs < 0 {
        return Err(MatchflowError::config(
            "promotion.race_window_secs must not be negative",
        ));
    }
    if config.session.history_limit == 0 {
        return Err(MatchflowError::config(
            "session.history_limit must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("absent.toml"));
        let config = service.load_config().unwrap();
        assert_eq!(config.resilience.auth_failure_threshold, 3);
        assert_eq!(config.promotion.race_window_secs, 5);
    }

    #[test]
    fn test_reads_and_caches_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[session]\nhistory_limit = 4\n");
        let service = ConfigService::with_path(&path);

        let first = service.get_config().unwrap();
        assert_eq!(first.session.history_limit, 4);

        // Cached until invalidated
        std::fs::write(&path, "[session]\nhistory_limit = 7\n").unwrap();
        assert_eq!(service.get_config().unwrap().session.history_limit, 4);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().session.history_limit, 7);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[resilience\nauth_failure_threshold = ");
        let err = ConfigService::with_path(path).load_config().unwrap_err();
        assert!(matches!(err, MatchflowError::Config(_)));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[resilience]\nauth_failure_threshold = 0\n");
        let err = ConfigService::with_path(path).load_config().unwrap_err();
        assert!(matches!(err, MatchflowError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_AUTH_FAILURE_THRESHOLD, "5"),
            (ENV_RACE_WINDOW_SECS, " 2 "),
        ]);
        let mut config = MatchflowConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.resilience.auth_failure_threshold, 5);
        assert_eq!(config.promotion.race_window_secs, 2);
        assert_eq!(config.session.history_limit, 10);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = MatchflowConfig::default();
        let err = apply_env_overrides(&mut config, |key| {
            (key == ENV_HISTORY_LIMIT).then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, MatchflowError::Config(_)));
    }
}
