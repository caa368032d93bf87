//! Settings file (`eurocode.toml`).
//!
//! ```toml
//! significant_digits = 3
//! output = "table"
//!
//! [partial_factors]
//! gamma_g = 1.35
//! gamma_q = 1.5
//! ```
//!
//! Every key is optional. Without `--config`, `./eurocode.toml` is read when
//! it exists and built-in defaults are used otherwise.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eurocode_core::loads::{GenerationSettings, PartialFactors};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "eurocode.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub significant_digits: usize,
    pub partial_factors: PartialFactors,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            significant_digits: GenerationSettings::DEFAULT_SIGNIFICANT_DIGITS,
            partial_factors: PartialFactors::default(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `./eurocode.toml` if present.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE}, using built-in settings");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read settings file {}", path.display()))?;
        let config = Self::from_toml_str(&content).with_context(|| format!("invalid settings in {}", path.display()))?;
        debug!(path = %path.display(), "settings loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.generation_settings().validate()?;
        Ok(config)
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            partial_factors: self.partial_factors,
            significant_digits: self.significant_digits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eurocode_core::CalcError;

    #[test]
    fn test_empty_file_is_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.generation_settings(), GenerationSettings::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml_str(
            r#"
            output = "json"

            [partial_factors]
            gamma_g = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.partial_factors.gamma_g, 1.0);
        assert_eq!(config.partial_factors.gamma_q, PartialFactors::GAMMA_Q);
        assert_eq!(config.significant_digits, 3);
    }

    #[test]
    fn test_invalid_digits_rejected() {
        let err = Config::from_toml_str("significant_digits = 0").unwrap_err();
        let calc = err.downcast_ref::<CalcError>().unwrap();
        assert_eq!(calc.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml_str("gamma_g = 1.2").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/eurocode.toml"))).is_err());
    }
}
