// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Generator configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::params::ParameterSet;

/// Config file picked up by [`GeneratorConfig::load`]
pub const CONFIG_FILE: &str = "figurine.toml";

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Exported asset path; `.gltf` selects the JSON container
    pub output: PathBuf,
    /// Name of the joined object
    pub object_name: String,
    pub params: ParameterSet,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("/tmp/standing_woman_lowpoly.glb"),
            object_name: crate::DEFAULT_OBJECT_NAME.to_string(),
            params: ParameterSet::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: GeneratorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Apply `FIGURINE_OUTPUT` and `FIGURINE_HEIGHT`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(output) = std::env::var("FIGURINE_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Ok(height) = std::env::var("FIGURINE_HEIGHT") {
            self.params.height = height
                .parse()
                .with_context(|| format!("FIGURINE_HEIGHT is not a number: {:?}", height))?;
        }

        Ok(self)
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.object_name, "Woman_LowPoly_Static");
        assert_eq!(config.params, ParameterSet::default());
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mut config = GeneratorConfig::default();
        config.params.height = 1.72;
        config.params.clothing.cuff_height = 0.0;
        config.save(file.path())?;

        let loaded = GeneratorConfig::from_file(file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(
            file.path(),
            r#"
            output = "out/figure.gltf"

            [params]
            height = 1.5
            "#,
        )?;

        let config = GeneratorConfig::from_file(file.path())?;
        assert_eq!(config.output, PathBuf::from("out/figure.gltf"));
        assert_eq!(config.object_name, "Woman_LowPoly_Static");
        assert_eq!(config.params.height, 1.5);
        assert_eq!(config.params.pose, ParameterSet::default().pose);
        Ok(())
    }

    #[test]
    fn test_malformed_file() -> Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), "params = 3")?;
        assert!(GeneratorConfig::from_file(file.path()).is_err());
        Ok(())
    }
}
