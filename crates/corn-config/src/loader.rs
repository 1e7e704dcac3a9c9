//! Resolution of [`CornConfig`] from the environment and a properties file.
//!
//! # Design
//! - Sources are captured into plain maps first so resolution is pure and testable.
//! - Per key: a non-empty environment value wins, then the properties file, then the default.
//! - Booleans that cannot be parsed fall back to their default with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::defaults::{
    DEFAULT_BIND_ADDR, DEFAULT_CLEANUP, DEFAULT_DATA, DEFAULT_ENGINE, DEFAULT_HTTP_PORT,
    DEFAULT_LOG_LEVEL, DEFAULT_TARGET, KEY_BIND_ADDR, KEY_CLEANUP, KEY_CONFIG_FILE, KEY_DATA,
    KEY_ENGINE, KEY_ENGINE_ARGS, KEY_HTTP_PORT, KEY_LOG_FORMAT, KEY_LOG_LEVEL, KEY_TARGET,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{CornConfig, EngineCommand};
use crate::validate::{parse_args, parse_bind_addr, parse_bool, parse_port};

/// Captured configuration sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    env: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
}

impl ConfigSources {
    /// Empty sources; every key resolves to its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the process environment and, when `CORN_CONFIG_FILE` is set,
    /// the properties file it points to.
    ///
    /// # Errors
    ///
    /// Returns an error if the named properties file cannot be read or parsed.
    pub fn from_process_env() -> ConfigResult<Self> {
        let mut sources = Self {
            env: std::env::vars().collect(),
            properties: BTreeMap::new(),
        };
        if let Some(path) = sources.env_value(KEY_CONFIG_FILE).map(PathBuf::from) {
            sources = sources.with_properties_file(&path)?;
        }
        Ok(sources)
    }

    /// Add or replace an environment value.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add or replace a property value.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge the scalar entries of a flat YAML mapping into the properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a mapping, or holds
    /// non-scalar values.
    pub fn with_properties_file(mut self, path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::PropertiesRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document: BTreeMap<String, serde_yaml::Value> =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::PropertiesParse {
                path: path.to_path_buf(),
                source,
            })?;

        for (key, value) in document {
            let rendered = match value {
                serde_yaml::Value::Null => continue,
                serde_yaml::Value::Bool(flag) => flag.to_string(),
                serde_yaml::Value::Number(number) => number.to_string(),
                serde_yaml::Value::String(text) => text,
                _ => {
                    return Err(ConfigError::InvalidField {
                        field: "properties",
                        reason: "not_scalar",
                        value: Some(key),
                    });
                }
            };
            self.properties.insert(key, rendered);
        }
        debug!(path = %path.display(), "loaded configuration properties");
        Ok(self)
    }

    /// Raw value for `key` after applying source precedence.
    ///
    /// Used to read logging settings before the full configuration is
    /// resolved, so resolution warnings reach the installed subscriber.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.lookup(key)
    }

    fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.env_value(key).or_else(|| {
            self.properties
                .get(key)
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
        })
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    fn flag_or(&self, key: &'static str, default: bool) -> bool {
        match self.lookup(key) {
            None => default,
            Some(raw) => parse_bool(raw).unwrap_or_else(|| {
                warn!(
                    field = key,
                    value = raw,
                    default,
                    "invalid boolean configuration value; using default"
                );
                default
            }),
        }
    }
}

/// Resolve the configuration snapshot from the captured sources.
///
/// # Errors
///
/// Returns an error when the bind address or port cannot be parsed.
pub fn load(sources: &ConfigSources) -> ConfigResult<CornConfig> {
    let bind_addr = parse_bind_addr(
        KEY_BIND_ADDR,
        &sources.string_or(KEY_BIND_ADDR, DEFAULT_BIND_ADDR),
    )?;
    let http_port = match sources.lookup(KEY_HTTP_PORT) {
        Some(raw) => parse_port(KEY_HTTP_PORT, raw)?,
        None => DEFAULT_HTTP_PORT,
    };

    let config = CornConfig {
        target_root: PathBuf::from(sources.string_or(KEY_TARGET, DEFAULT_TARGET)),
        cleanup: sources.flag_or(KEY_CLEANUP, DEFAULT_CLEANUP),
        data_root: PathBuf::from(sources.string_or(KEY_DATA, DEFAULT_DATA)),
        bind_addr,
        http_port,
        engine: EngineCommand {
            program: sources.string_or(KEY_ENGINE, DEFAULT_ENGINE),
            args: sources.lookup(KEY_ENGINE_ARGS).map(parse_args).unwrap_or_default(),
        },
        log_level: sources.string_or(KEY_LOG_LEVEL, DEFAULT_LOG_LEVEL),
        log_format: sources.lookup(KEY_LOG_FORMAT).map(str::to_string),
    };
    debug!(
        target_root = %config.target_root.display(),
        cleanup = config.cleanup,
        "configuration resolved"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn defaults_apply_without_sources() -> Result<()> {
        let config = load(&ConfigSources::new())?;
        assert_eq!(config.target_root, PathBuf::from("target/"));
        assert!(config.cleanup);
        assert_eq!(config.data_root, PathBuf::from("data/"));
        assert_eq!(config.bind_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.http_port, 7070);
        assert_eq!(config.engine.program, "corn");
        assert!(config.engine.args.is_empty());
        assert_eq!(config.log_level, "info");
        assert!(config.log_format.is_none());
        Ok(())
    }

    #[test]
    fn environment_overrides_properties() -> Result<()> {
        let sources = ConfigSources::new()
            .with_property(KEY_TARGET, "/srv/props/")
            .with_env(KEY_TARGET, "/srv/env/")
            .with_property(KEY_CLEANUP, "false");
        let config = load(&sources)?;
        assert_eq!(config.target_root, PathBuf::from("/srv/env/"));
        assert!(!config.cleanup);
        Ok(())
    }

    #[test]
    fn value_exposes_resolved_raw_setting() {
        let sources = ConfigSources::new()
            .with_property(KEY_LOG_LEVEL, "debug")
            .with_env(KEY_LOG_FORMAT, "json");
        assert_eq!(sources.value(KEY_LOG_LEVEL), Some("debug"));
        assert_eq!(sources.value(KEY_LOG_FORMAT), Some("json"));
        assert_eq!(sources.value(KEY_ENGINE), None);
    }

    #[test]
    fn empty_environment_value_falls_through_to_properties() -> Result<()> {
        let sources = ConfigSources::new()
            .with_env(KEY_TARGET, "")
            .with_property(KEY_TARGET, "/srv/props/");
        let config = load(&sources)?;
        assert_eq!(config.target_root, PathBuf::from("/srv/props/"));
        Ok(())
    }

    #[test]
    fn cleanup_reads_its_own_key() -> Result<()> {
        let sources = ConfigSources::new()
            .with_env(KEY_TARGET, "/tmp/work/")
            .with_env(KEY_CLEANUP, "false");
        assert!(!load(&sources)?.cleanup);
        Ok(())
    }

    #[test]
    fn invalid_cleanup_flag_defaults_to_enabled() -> Result<()> {
        let sources = ConfigSources::new().with_env(KEY_CLEANUP, "sometimes");
        assert!(load(&sources)?.cleanup);
        Ok(())
    }

    #[test]
    fn invalid_port_is_rejected() {
        let sources = ConfigSources::new().with_env(KEY_HTTP_PORT, "http");
        assert!(matches!(
            load(&sources),
            Err(ConfigError::InvalidField {
                field: KEY_HTTP_PORT,
                ..
            })
        ));
    }

    #[test]
    fn engine_args_are_split() -> Result<()> {
        let sources = ConfigSources::new()
            .with_env(KEY_ENGINE, "/opt/corn/bin/corn")
            .with_env(KEY_ENGINE_ARGS, "run --quiet");
        let config = load(&sources)?;
        assert_eq!(config.engine.program, "/opt/corn/bin/corn");
        assert_eq!(config.engine.args, vec!["run", "--quiet"]);
        Ok(())
    }
}
