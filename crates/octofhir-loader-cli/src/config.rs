use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use octofhir_loader::{BundleSize, LoaderConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileConfig {
    pub bundle_size: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub parallelism: Option<usize>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// Values given on the command line; they win over the profile.
#[derive(Debug, Default)]
pub struct Overrides {
    pub bundle_size: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub parallelism: Option<usize>,
}

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".octofhir");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("loader.toml"))
}

pub fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn save_all_to(path: &Path, all: &ConfigFile) -> Result<()> {
    let content = toml::to_string_pretty(all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(&config_path()?)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let path = config_path()?;
    let mut all = load_all_from(&path)?;
    all.insert(profile.to_string(), config.clone());
    save_all_to(&path, &all)
}

/// Update one key of a profile from its string form.
pub fn set_key(cfg: &mut ProfileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "bundle_size" => {
            let size: i64 = value
                .parse()
                .with_context(|| format!("Invalid bundle_size: {value}"))?;
            BundleSize::try_from(size)?;
            cfg.bundle_size = Some(size);
        }
        "output_dir" => cfg.output_dir = Some(PathBuf::from(value)),
        "parallelism" => {
            let parallelism: usize = value
                .parse()
                .with_context(|| format!("Invalid parallelism: {value}"))?;
            if parallelism == 0 {
                anyhow::bail!("parallelism must be at least 1");
            }
            cfg.parallelism = Some(parallelism);
        }
        other => {
            anyhow::bail!("Unknown config key: {other}. Valid keys: bundle_size, output_dir, parallelism")
        }
    }
    Ok(())
}

/// Merge defaults, the stored profile and command-line overrides, in that order.
pub fn resolve(profile: &ProfileConfig, overrides: Overrides) -> Result<LoaderConfig> {
    let mut config = LoaderConfig::default();

    if let Some(size) = overrides.bundle_size.or(profile.bundle_size) {
        config = config.with_bundle_size(BundleSize::try_from(size)?);
    }
    if let Some(dir) = overrides.output_dir.or_else(|| profile.output_dir.clone()) {
        config = config.with_output_dir(dir);
    }
    if let Some(parallelism) = overrides.parallelism.or(profile.parallelism) {
        config = config.with_parallelism(parallelism);
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = resolve(&ProfileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_overrides_win_over_profile() {
        let profile = ProfileConfig {
            bundle_size: Some(50),
            output_dir: Some(PathBuf::from("profile-out")),
            parallelism: Some(2),
        };
        let overrides = Overrides {
            bundle_size: Some(10),
            output_dir: None,
            parallelism: None,
        };
        let config = resolve(&profile, overrides).unwrap();
        assert_eq!(config.bundle_size.get(), 10);
        assert_eq!(config.output_dir, Some(PathBuf::from("profile-out")));
        assert_eq!(config.parallelism, 2);
    }

    #[test]
    fn test_resolve_rejects_non_positive_bundle_size() {
        let overrides = Overrides {
            bundle_size: Some(0),
            ..Overrides::default()
        };
        assert!(resolve(&ProfileConfig::default(), overrides).is_err());

        let overrides = Overrides {
            parallelism: Some(0),
            ..Overrides::default()
        };
        assert!(resolve(&ProfileConfig::default(), overrides).is_err());
    }

    #[test]
    fn test_set_key() {
        let mut cfg = ProfileConfig::default();
        set_key(&mut cfg, "bundle_size", "250").unwrap();
        set_key(&mut cfg, "output_dir", "/tmp/out").unwrap();
        set_key(&mut cfg, "parallelism", "3").unwrap();
        assert_eq!(cfg.bundle_size, Some(250));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cfg.parallelism, Some(3));

        assert!(set_key(&mut cfg, "bundle_size", "-1").is_err());
        assert!(set_key(&mut cfg, "bundle_size", "abc").is_err());
        assert!(set_key(&mut cfg, "parallelism", "0").is_err());
        assert!(set_key(&mut cfg, "server", "http://x").is_err());
    }

    #[test]
    fn test_profiles_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loader.toml");
        assert!(load_all_from(&path).unwrap().is_empty());

        let mut all = ConfigFile::new();
        all.insert(
            "bulk".to_string(),
            ProfileConfig {
                bundle_size: Some(1000),
                output_dir: None,
                parallelism: Some(4),
            },
        );
        save_all_to(&path, &all).unwrap();

        let loaded = load_all_from(&path).unwrap();
        assert_eq!(loaded.get("bulk"), all.get("bulk"));
    }
}
