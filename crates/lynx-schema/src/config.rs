use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix prepended to every native entry point name (`engine_startup`, ...).
pub const DEFAULT_SYMBOL_PREFIX: &str = "engine_";

const MAX_FRAME_RATE: u32 = 240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported config_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("engine.library must be set when engine.backend = \"dylib\"")]
    MissingLibrary,
    #[error("driver.frame_rate must be between 1 and 240, got {0}")]
    InvalidFrameRate(u32),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub config_version: u32,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub driver: DriverSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default = "default_symbol_prefix")]
    pub symbol_prefix: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            library: None,
            symbol_prefix: default_symbol_prefix(),
        }
    }
}

/// Behavior flags that unify the historical bridge variants (with or without
/// an asset-manager argument, with or without status-bar metrics).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_true")]
    pub forward_density_metrics: bool,
    #[serde(default = "default_true")]
    pub asset_source_required: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            forward_density_metrics: true,
            asset_source_required: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DriverSection {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}

fn default_backend() -> String {
    "dylib".to_owned()
}

fn default_symbol_prefix() -> String {
    DEFAULT_SYMBOL_PREFIX.to_owned()
}

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> u32 {
    60
}

impl BridgeConfig {
    /// A configuration that drives the recording engine with default session flags.
    pub fn mock() -> Self {
        Self {
            config_version: 1,
            engine: EngineSection {
                backend: "mock".to_owned(),
                ..EngineSection::default()
            },
            session: SessionSection::default(),
            driver: DriverSection::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.config_version != 1 {
            return Err(ConfigError::UnsupportedVersion(self.config_version));
        }
        if self.engine.backend == "dylib" && self.engine.library.is_none() {
            return Err(ConfigError::MissingLibrary);
        }
        if self.driver.frame_rate == 0 || self.driver.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::InvalidFrameRate(self.driver.frame_rate));
        }
        Ok(())
    }

    /// Relative library paths are resolved against `base`, normally the
    /// directory holding the config file.
    #[must_use]
    pub fn with_library_base(mut self, base: &Path) -> Self {
        if let Some(lib) = self.engine.library.as_ref() {
            if lib.is_relative() && lib.components().count() > 1 {
                self.engine.library = Some(base.join(lib));
            }
        }
        self
    }
}

pub fn parse_config_str(input: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig = toml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<BridgeConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let config = parse_config_str(&content)?;
    Ok(match path.parent() {
        Some(base) => config.with_library_base(base),
        None => config,
    })
}
