use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bundle_size::BundleSize;
use crate::error::{LoaderError, Result};

/// Settings for a bundling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub bundle_size: BundleSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Number of files converted concurrently.
    pub parallelism: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            bundle_size: BundleSize::default(),
            output_dir: None,
            parallelism: 1,
        }
    }
}

impl LoaderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(LoaderError::configuration("parallelism must be at least 1"));
        }
        Ok(())
    }

    pub fn with_bundle_size(mut self, bundle_size: BundleSize) -> Self {
        self.bundle_size = bundle_size;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.bundle_size.get(), 500);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn test_parse_toml() {
        let config = LoaderConfig::from_toml_str(
            r#"
            bundle_size = 100
            output_dir = "/tmp/bundles"
            parallelism = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.bundle_size.get(), 100);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/bundles")));
        assert_eq!(config.parallelism, 4);
    }

    #[test]
    fn test_non_positive_bundle_size_rejected() {
        let err = LoaderConfig::from_toml_str("bundle_size = 0").unwrap_err();
        assert!(matches!(err, LoaderError::Toml(_)));
        assert!(LoaderConfig::from_toml_str("bundle_size = -3").is_err());
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let err = LoaderConfig::from_toml_str("parallelism = 0").unwrap_err();
        assert!(matches!(err, LoaderError::Configuration(_)));
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::default()
            .with_bundle_size(BundleSize::new(10).unwrap())
            .with_output_dir("out")
            .with_parallelism(2);
        assert_eq!(config.bundle_size.get(), 10);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.parallelism, 2);
    }
}
