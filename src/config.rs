//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.dataprep.toml` files. Every table and field is optional; missing
//! values fall back to the mappings the dataset was originally labelled with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".dataprep.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// `reorganize` settings.
    #[serde(default)]
    pub reorganize: ReorganizeConfig,

    /// `delete-to-n` settings.
    #[serde(default)]
    pub downsize: DownsizeConfig,

    /// `map-class-names` settings.
    #[serde(default)]
    pub map_names: MapNamesConfig,

    /// `underscore-to-dash` settings.
    #[serde(default)]
    pub underscore: UnderscoreConfig,

    /// `reduce-classes` settings.
    #[serde(default)]
    pub reduce: ReduceConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Dataset root holding the `train`, `validation` and `test` splits.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
        }
    }
}

fn default_dataset() -> PathBuf {
    PathBuf::from("dataset")
}

/// Settings for moving loose images into class folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizeConfig {
    /// Splits whose top level holds loose images.
    #[serde(default = "default_reorganize_splits")]
    pub splits: Vec<String>,
}

impl Default for ReorganizeConfig {
    fn default() -> Self {
        Self {
            splits: default_reorganize_splits(),
        }
    }
}

fn default_reorganize_splits() -> Vec<String> {
    vec!["validation".to_string(), "test".to_string()]
}

/// Settings for random class downsizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsizeConfig {
    /// Extensions counted (and deleted) as images.
    #[serde(default = "default_downsize_extensions")]
    pub extensions: Vec<String>,

    /// Seed for reproducible sampling. Entropy-seeded when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DownsizeConfig {
    fn default() -> Self {
        Self {
            extensions: default_downsize_extensions(),
            seed: None,
        }
    }
}

fn default_downsize_extensions() -> Vec<String> {
    vec!["jpg".to_string()]
}

/// An ordered substring replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

impl Substitution {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Settings for renaming severity words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapNamesConfig {
    /// Substitutions applied in order to folder and file names.
    #[serde(default = "default_substitutions")]
    pub substitutions: Vec<Substitution>,
}

impl Default for MapNamesConfig {
    fn default() -> Self {
        Self {
            substitutions: default_substitutions(),
        }
    }
}

fn default_substitutions() -> Vec<Substitution> {
    vec![
        Substitution::new("smooth", "good"),
        Substitution::new("slight", "intermediate"),
        Substitution::new("severe", "bad"),
    ]
}

/// Settings for underscore normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderscoreConfig {
    /// Folder names containing any of these keep their underscores.
    #[serde(default = "default_underscore_exceptions")]
    pub exceptions: Vec<String>,
}

impl Default for UnderscoreConfig {
    fn default() -> Self {
        Self {
            exceptions: default_underscore_exceptions(),
        }
    }
}

fn default_underscore_exceptions() -> Vec<String> {
    vec!["fresh_snow".to_string(), "melted_snow".to_string()]
}

/// A fine-grained class substring and the coarse class it merges into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapping {
    pub from: String,
    pub to: String,
}

/// Settings for class consolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReduceConfig {
    /// Extensions copied into the reduced layout.
    #[serde(default = "default_reduce_extensions")]
    pub extensions: Vec<String>,

    /// Ordered mapping; the first entry contained in a folder name wins.
    #[serde(default = "default_class_mappings")]
    pub mappings: Vec<ClassMapping>,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            extensions: default_reduce_extensions(),
            mappings: default_class_mappings(),
        }
    }
}

fn default_class_mappings() -> Vec<ClassMapping> {
    [
        ("dry-asphalt-good", "asphalt-good"),
        ("dry-asphalt-intermediate", "asphalt-intermediate"),
        ("dry-asphalt-bad", "asphalt-bad"),
        ("wet-asphalt-good", "asphalt-good"),
        ("wet-asphalt-intermediate", "asphalt-intermediate"),
        ("wet-asphalt-bad", "asphalt-bad"),
        ("water-asphalt-smooth", "water-asphalt"),
        // map-class-names runs first and turns "smooth" into "good"
        ("water-asphalt-good", "water-asphalt"),
        ("water-asphalt-intermediate", "water-asphalt"),
        ("water-asphalt-bad", "water-asphalt"),
        ("dry-concrete-good", "paved-good"),
        ("dry-concrete-intermediate", "paved-intermediate"),
        ("dry-concrete-bad", "paved-bad"),
        ("wet-concrete-good", "paved-good"),
        ("wet-concrete-intermediate", "paved-intermediate"),
        ("wet-concrete-bad", "paved-bad"),
        ("water-concrete-good", "water-paved"),
        ("water-concrete-intermediate", "water-paved"),
        ("water-concrete-bad", "water-paved"),
        ("dry-gravel", "unpaved"),
        ("dry-mud", "unpaved"),
        ("wet-gravel", "unpaved"),
        ("wet-mud", "unpaved"),
        ("water-gravel", "water-unpaved"),
        ("water-mud", "water-unpaved"),
        ("fresh_snow", "unpaved"),
        ("melted_snow", "unpaved"),
        ("ice", "unpaved"),
    ]
    .into_iter()
    .map(|(from, to)| ClassMapping {
        from: from.to_string(),
        to: to.to_string(),
    })
    .collect()
}

fn default_reduce_extensions() -> Vec<String> {
    vec!["png", "jpg", "jpeg"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dataset) = args.dataset {
            self.general.dataset = dataset.clone();
        }

        if let crate::cli::Command::DeleteToN { seed: Some(seed), .. } = args.command {
            self.downsize.seed = Some(seed);
        }
    }

    /// Distinct coarse classes, in first-seen order.
    pub fn coarse_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for mapping in &self.reduce.mappings {
            if !classes.contains(&mapping.to) {
                classes.push(mapping.to.clone());
            }
        }
        classes
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.dataset, PathBuf::from("dataset"));
        assert_eq!(config.reorganize.splits, vec!["validation", "test"]);
        assert_eq!(config.downsize.extensions, vec!["jpg"]);
        assert_eq!(config.map_names.substitutions.len(), 3);
        assert_eq!(config.reduce.mappings.len(), 28);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
dataset = "/data/roads"

[downsize]
seed = 7

[[map_names.substitutions]]
from = "rough"
to = "bad"

[underscore]
exceptions = ["keep_me"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.dataset, PathBuf::from("/data/roads"));
        assert_eq!(config.downsize.seed, Some(7));
        assert_eq!(config.downsize.extensions, vec!["jpg"]);
        assert_eq!(
            config.map_names.substitutions,
            vec![Substitution::new("rough", "bad")]
        );
        assert_eq!(config.underscore.exceptions, vec!["keep_me"]);
        // untouched tables keep their defaults
        assert_eq!(config.reduce.extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn test_coarse_classes_are_distinct_and_ordered() {
        let classes = Config::default().coarse_classes();
        assert_eq!(classes.first().map(String::as_str), Some("asphalt-good"));
        assert_eq!(classes.len(), 10);
        assert!(classes.contains(&"water-unpaved".to_string()));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[downsize]"));
        assert!(toml_str.contains("[[reduce.mappings]]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.reduce.mappings.len(), 28);
    }
}
