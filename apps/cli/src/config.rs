// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use anyhow::{Context, Result};
use shedkit_core::EngineConfig;
use std::path::PathBuf;

/// CLI configuration. Command-line flags override every field.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// OBJ file to write.
    pub output: PathBuf,
    /// JSON build report; logged as a summary when absent.
    pub report: Option<PathBuf>,
    /// Engine constants JSON; built-in defaults when absent.
    pub engine_config: Option<PathBuf>,
    /// Tracing filter directives.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            output: var("SHEDKIT_OUTPUT")
                .unwrap_or_else(|| "building.obj".into())
                .into(),
            report: var("SHEDKIT_REPORT").filter(|s| !s.is_empty()).map(PathBuf::from),
            engine_config: var("SHEDKIT_ENGINE_CONFIG")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            log_filter: var("RUST_LOG").unwrap_or_else(|| "info,shedkit=debug".into()),
        }
    }

    /// Engine constants from `engine_config`, or the defaults.
    pub fn load_engine_config(&self) -> Result<EngineConfig> {
        let Some(path) = &self.engine_config else {
            return Ok(EngineConfig::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        EngineConfig::from_json(&json).with_context(|| format!("parsing engine config {}", path.display()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.output, PathBuf::from("building.obj"));
        assert_eq!(config.report, None);
        assert_eq!(config.engine_config, None);
        assert_eq!(config.log_filter, "info,shedkit=debug");
        assert_eq!(config.load_engine_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("SHEDKIT_OUTPUT", "/tmp/shed.obj"),
            ("SHEDKIT_REPORT", "/tmp/shed.json"),
            ("SHEDKIT_ENGINE_CONFIG", ""),
            ("RUST_LOG", "warn"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.output, PathBuf::from("/tmp/shed.obj"));
        assert_eq!(config.report, Some(PathBuf::from("/tmp/shed.json")));
        assert_eq!(config.engine_config, None);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_missing_engine_config_is_an_error() {
        let config = Config {
            engine_config: Some(PathBuf::from("/nonexistent/shedkit-engine.json")),
            ..Config::from_lookup(|_| None)
        };
        assert!(config.load_engine_config().is_err());
    }
}
