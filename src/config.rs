//! Configuration file support for modulizer
//!
//! This module handles parsing `.modulizer.toml` configuration files that
//! tune the thresholds used when deciding whether a cluster of components
//! becomes a module.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .modulizer.toml
//!
//! [criteria]
//! # Minimum average cohesion of a cluster
//! cohesion_threshold = 0.7
//!
//! # Minimum maturity score of a candidate (and of the cluster average)
//! maturity_threshold = 0.8
//!
//! # Minimum connectivity between a seed and a candidate
//! connectivity_threshold = 0.6
//!
//! # Cluster size bounds
//! min_members = 2
//! max_members = 10
//!
//! [formation]
//! # Allow components that already belong to a module to be grouped again
//! allow_regrouping = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid formation criteria: {0}")]
    InvalidCriteria(String),
}

/// Thresholds a cluster must satisfy to be encapsulated into a module
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationCriteria {
    /// Minimum average cohesion across the cluster
    #[serde(default = "default_cohesion_threshold")]
    pub cohesion_threshold: f64,

    /// Minimum maturity score for candidates and for the cluster average
    #[serde(default = "default_maturity_threshold")]
    pub maturity_threshold: f64,

    /// Minimum seed-to-candidate connectivity to join a cluster
    #[serde(default = "default_connectivity_threshold")]
    pub connectivity_threshold: f64,

    /// Smallest cluster that may form a module
    #[serde(default = "default_min_members")]
    pub min_members: usize,

    /// Largest cluster that may form a module
    #[serde(default = "default_max_members")]
    pub max_members: usize,
}

fn default_cohesion_threshold() -> f64 {
    0.7
}

fn default_maturity_threshold() -> f64 {
    0.8
}

fn default_connectivity_threshold() -> f64 {
    0.6
}

fn default_min_members() -> usize {
    2
}

fn default_max_members() -> usize {
    10
}

impl Default for FormationCriteria {
    fn default() -> Self {
        Self {
            cohesion_threshold: default_cohesion_threshold(),
            maturity_threshold: default_maturity_threshold(),
            connectivity_threshold: default_connectivity_threshold(),
            min_members: default_min_members(),
            max_members: default_max_members(),
        }
    }
}

impl FormationCriteria {
    /// Reject thresholds outside [0, 1] and inconsistent size bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            ("cohesion_threshold", self.cohesion_threshold),
            ("maturity_threshold", self.maturity_threshold),
            ("connectivity_threshold", self.connectivity_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidCriteria(format!(
                    "{} must be within 0.0..=1.0 (got {})",
                    name, value
                )));
            }
        }

        if self.min_members == 0 {
            return Err(ConfigError::InvalidCriteria(
                "min_members must be at least 1".to_string(),
            ));
        }
        if self.min_members > self.max_members {
            return Err(ConfigError::InvalidCriteria(format!(
                "min_members ({}) exceeds max_members ({})",
                self.min_members, self.max_members
            )));
        }

        Ok(())
    }

    /// Whether a cluster of `size` members is within the allowed bounds
    pub fn size_in_bounds(&self, size: usize) -> bool {
        size >= self.min_members && size <= self.max_members
    }
}

/// Formation policy section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormationConfig {
    /// Let components that already belong to a module be clustered again
    #[serde(default)]
    pub allow_regrouping: bool,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModulizerConfig {
    /// Formation thresholds
    #[serde(default)]
    pub criteria: FormationCriteria,

    /// Formation policy
    #[serde(default)]
    pub formation: FormationConfig,
}

impl ModulizerConfig {
    /// Parse and validate a configuration document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ModulizerConfig = toml::from_str(content)?;
        config.criteria.validate()?;
        Ok(config)
    }
}

/// Load configuration for the given path
///
/// A file path is read directly. A directory is searched, together with its
/// parents, for `.modulizer.toml` or `modulizer.toml`. When nothing is found
/// the defaults are returned.
pub fn load_config(path: &Path) -> Result<ModulizerConfig, ConfigError> {
    let config_path = if path.is_file() {
        Some(path.to_path_buf())
    } else {
        find_config_file(path)
    };

    match config_path {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            ModulizerConfig::from_toml(&content)
        }
        None => Ok(ModulizerConfig::default()),
    }
}

/// Find the config file by searching up the directory tree
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".modulizer.toml", "modulizer.toml"];

    let mut current = start_path.to_path_buf();

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModulizerConfig::default();
        assert_eq!(config.criteria.cohesion_threshold, 0.7);
        assert_eq!(config.criteria.maturity_threshold, 0.8);
        assert_eq!(config.criteria.connectivity_threshold, 0.6);
        assert_eq!(config.criteria.min_members, 2);
        assert_eq!(config.criteria.max_members, 10);
        assert!(!config.formation.allow_regrouping);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [criteria]
            cohesion_threshold = 0.5
            max_members = 4

            [formation]
            allow_regrouping = true
        "#;

        let config = ModulizerConfig::from_toml(toml).unwrap();
        assert_eq!(config.criteria.cohesion_threshold, 0.5);
        assert_eq!(config.criteria.max_members, 4);
        // Unspecified keys keep their defaults
        assert_eq!(config.criteria.maturity_threshold, 0.8);
        assert_eq!(config.criteria.min_members, 2);
        assert!(config.formation.allow_regrouping);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let toml = r#"
            [criteria]
            connectivity_threshold = 1.5
        "#;

        let err = ModulizerConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCriteria(_)));
        assert!(err.to_string().contains("connectivity_threshold"));
    }

    #[test]
    fn test_inconsistent_member_bounds_rejected() {
        let criteria = FormationCriteria {
            min_members: 5,
            max_members: 3,
            ..FormationCriteria::default()
        };
        assert!(criteria.validate().is_err());

        let criteria = FormationCriteria {
            min_members: 0,
            ..FormationCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_size_in_bounds() {
        let criteria = FormationCriteria::default();
        assert!(!criteria.size_in_bounds(1));
        assert!(criteria.size_in_bounds(2));
        assert!(criteria.size_in_bounds(10));
        assert!(!criteria.size_in_bounds(11));
    }

    #[test]
    fn test_find_config_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(".modulizer.toml"),
            "[criteria]\nmin_members = 3\n",
        )
        .unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.criteria.min_members, 3);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[criteria]\ncohesion_threshold = 0.9\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.criteria.cohesion_threshold, 0.9);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modulizer.toml");
        fs::write(&path, "[criteria\nmin_members = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
