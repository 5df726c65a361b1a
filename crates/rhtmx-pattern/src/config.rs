// File: src/config.rs
// Purpose: Matcher configuration parsing from a `[matcher]` TOML table

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ParseOptions;

/// Top-level file layout; only the `[matcher]` table is read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    matcher: MatcherConfig,
}

/// Matcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Largest optional-group expansion a trie accepts per pattern (default: 256)
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,

    /// Whether patterns added from source strings ignore pathname case (default: false)
    #[serde(default = "default_false")]
    pub ignore_case: bool,
}

// Default values
fn default_max_variants() -> usize {
    256
}

fn default_false() -> bool {
    false
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_variants: default_max_variants(),
            ignore_case: false,
        }
    }
}

impl MatcherConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(file.matcher)
    }

    /// Options for parsing pattern sources under this configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            ignore_case: self.ignore_case,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MatcherConfig::default();
        assert_eq!(config.max_variants, 256);
        assert!(!config.ignore_case);
        assert!(!config.parse_options().ignore_case);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MatcherConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, MatcherConfig::default());
    }

    #[test]
    fn test_load_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        assert_eq!(MatcherConfig::load(file.path()).unwrap(), MatcherConfig::default());
    }

    #[test]
    fn test_load_matcher_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matcher]\nmax_variants = 16\nignore_case = true").unwrap();

        let config = MatcherConfig::load(file.path()).unwrap();
        assert_eq!(config.max_variants, 16);
        assert!(config.ignore_case);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matcher]\nignore_case = true\n\n[other]\nkey = 1").unwrap();

        let config = MatcherConfig::load(file.path()).unwrap();
        assert_eq!(config.max_variants, 256);
        assert!(config.ignore_case);
    }

    #[test]
    fn test_invalid_toml_has_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matcher\nmax_variants = ").unwrap();

        let err = MatcherConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
