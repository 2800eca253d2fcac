use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "techval.yaml";
pub const DEFAULT_ENGINE_PROGRAM: &str = "techval-engine";
pub const DEFAULT_ENTRY_POINT: &str = "alfresco-technical-validation.core/validate-java";
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TechvalConfig {
    /// Graph database endpoint used when neither flag nor env var provides one.
    pub neo4j_url: Option<String>,

    pub engine: EngineConfig,
}

/// How to reach the external validation engine.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Executable name (looked up on PATH) or path.
    pub program: String,

    /// Arguments; may contain `{source}`, `{binary}`, `{neo4j_url}` and `{entry_point}`.
    /// Without any input placeholder the three inputs are appended in that order.
    pub args: Vec<String>,

    /// `namespace/function` of the engine's validation entry point.
    pub entry_point: Option<String>,

    pub timeout_secs: u64,

    pub working_dir: Option<PathBuf>,

    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ENGINE_PROGRAM.to_string(),
            args: Vec::new(),
            entry_point: Some(DEFAULT_ENTRY_POINT.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

impl TechvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "engine.program must not be empty".to_string(),
            ));
        }
        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "engine.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the config at `path`.
///
/// When `explicit` is false (the default path was used) a missing file yields
/// the built-in defaults; an explicitly requested file must exist.
pub fn load_config(path: &Path, explicit: bool) -> Result<TechvalConfig, ConfigError> {
    if !path.exists() {
        if explicit {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(TechvalConfig::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = parse_config(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn parse_config(raw: &str) -> Result<TechvalConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(TechvalConfig::default());
    }
    serde_yaml::from_str(raw)
}
