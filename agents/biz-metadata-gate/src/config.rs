//! Gate configuration
//!
//! Settings are layered: defaults, then an optional TOML file, then
//! `BIZ_GATE_*` environment variables, then CLI flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GateError, Result};

/// Default maximum `ref:` chain length
pub const DEFAULT_MAX_REF_DEPTH: usize = 5;

/// Environment variable names
pub const ENV_MODE: &str = "BIZ_GATE_MODE";
pub const ENV_MAX_REF_DEPTH: &str = "BIZ_GATE_MAX_REF_DEPTH";
pub const ENV_FAIL_ON_WARN: &str = "BIZ_GATE_FAIL_ON_WARN";

/// Which gate is being enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Pre-ingestion gate: structural and field checks
    #[default]
    Import,
    /// Pre-publish gate: import checks plus object/array completeness
    Publish,
}

impl GateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateMode::Import => "import",
            GateMode::Publish => "publish",
        }
    }
}

impl fmt::Display for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateMode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "import" => Ok(GateMode::Import),
            "publish" => Ok(GateMode::Publish),
            other => Err(GateError::config_error(format!(
                "mode must be one of: import, publish (got '{}')",
                other
            ))),
        }
    }
}

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Gate mode
    pub mode: GateMode,

    /// Maximum number of `ref:` hops followed before failing with TYPE_REF_TOO_DEEP
    pub max_ref_depth: usize,

    /// Treat WARN violations as gate failures
    pub fail_on_warn: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: GateMode::Import,
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
            fail_on_warn: false,
        }
    }
}

impl GateConfig {
    /// Create a new config builder
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::new()
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GateConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GateError::file_error(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = mode.parse()?;
        }
        if let Some(depth) = lookup(ENV_MAX_REF_DEPTH) {
            self.max_ref_depth = depth.trim().parse().map_err(|_| {
                GateError::config_error(format!(
                    "{} must be a positive integer (got '{}')",
                    ENV_MAX_REF_DEPTH, depth
                ))
            })?;
        }
        if let Some(flag) = lookup(ENV_FAIL_ON_WARN) {
            self.fail_on_warn = parse_bool(&flag).ok_or_else(|| {
                GateError::config_error(format!(
                    "{} must be a boolean (got '{}')",
                    ENV_FAIL_ON_WARN, flag
                ))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check construction parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_ref_depth == 0 {
            return Err(GateError::config_error(
                "max_ref_depth must be a positive integer",
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for GateConfig
pub struct GateConfigBuilder {
    config: GateConfig,
}

impl GateConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: GateConfig::default(),
        }
    }

    /// Set the gate mode
    pub fn mode(mut self, mode: GateMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the maximum reference depth
    pub fn max_ref_depth(mut self, depth: usize) -> Self {
        self.config.max_ref_depth = depth;
        self
    }

    /// Fail the gate when warnings are present
    pub fn fail_on_warn(mut self, enabled: bool) -> Self {
        self.config.fail_on_warn = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GateConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for GateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GateConfig::default();
        assert_eq!(config.mode, GateMode::Import);
        assert_eq!(config.max_ref_depth, 5);
        assert!(!config.fail_on_warn);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("import".parse::<GateMode>().unwrap(), GateMode::Import);
        assert_eq!(" Publish ".parse::<GateMode>().unwrap(), GateMode::Publish);
        let err = "release".parse::<GateMode>().unwrap_err();
        assert!(matches!(err, GateError::ConfigError(_)));
    }

    #[test]
    fn test_config_builder() {
        let config = GateConfig::builder()
            .mode(GateMode::Publish)
            .max_ref_depth(3)
            .fail_on_warn(true)
            .build()
            .unwrap();

        assert_eq!(config.mode, GateMode::Publish);
        assert_eq!(config.max_ref_depth, 3);
        assert!(config.fail_on_warn);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(GateConfig::builder().max_ref_depth(0).build().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = GateConfig::from_toml_str("mode = \"publish\"\nmax_ref_depth = 8\n").unwrap();
        assert_eq!(config.mode, GateMode::Publish);
        assert_eq!(config.max_ref_depth, 8);
        assert!(!config.fail_on_warn);
    }

    #[test]
    fn test_from_toml_unknown_mode() {
        let err = GateConfig::from_toml_str("mode = \"staging\"\n").unwrap_err();
        assert!(matches!(err, GateError::ConfigError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_MODE, "publish"),
            (ENV_MAX_REF_DEPTH, "2"),
            (ENV_FAIL_ON_WARN, "yes"),
        ]
        .into_iter()
        .collect();

        let config = GateConfig::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.mode, GateMode::Publish);
        assert_eq!(config.max_ref_depth, 2);
        assert!(config.fail_on_warn);
    }

    #[test]
    fn test_env_override_invalid_depth() {
        let result = GateConfig::default().with_env_overrides(|key| {
            (key == ENV_MAX_REF_DEPTH).then(|| "deep".to_string())
        });
        assert!(matches!(result, Err(GateError::ConfigError(_))));
    }
}
