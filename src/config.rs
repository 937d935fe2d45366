use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::EmissionFactorTable;
use crate::model::DEFAULT_TARGET_CATEGORIES;

/// External process that takes the payload path as its last argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploaderConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Run configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Overrides the model's own title when building the project id.
    pub project_title: Option<String>,
    pub output_path: PathBuf,
    pub target_categories: Vec<String>,
    pub factors: EmissionFactorTable,
    pub uploader: Option<UploaderConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            project_title: None,
            output_path: PathBuf::from("out/emissions.json"),
            target_categories: DEFAULT_TARGET_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            factors: EmissionFactorTable::default(),
            uploader: None,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, LedgerError> {
        let cfg: RunConfig = toml::from_str(text)?;
        cfg.factors.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmissionFactor;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = RunConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(cfg.target_categories.len(), 6);
        assert_eq!(cfg.factors.concrete, EmissionFactor::new(0.120, 0.005, 0.008));
    }

    #[test]
    fn test_partial_factor_override() {
        let text = r#"
            project_title = "Tower A"
            output_path = "runs/tower_a.json"
            target_categories = ["Floors"]

            [factors.Steel]
            a1a3 = 1.55
            a4 = 0.03
            a5 = 0.2

            [uploader]
            program = "python3"
            args = ["scripts/upload.py"]
        "#;
        let cfg = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(cfg.project_title.as_deref(), Some("Tower A"));
        assert_eq!(cfg.output_path, PathBuf::from("runs/tower_a.json"));
        assert_eq!(cfg.target_categories, vec!["Floors".to_string()]);
        assert_eq!(cfg.factors.steel, EmissionFactor::new(1.55, 0.03, 0.2));
        assert_eq!(cfg.factors.clt, EmissionFactorTable::default().clt);
        assert_eq!(cfg.uploader.unwrap().args, vec!["scripts/upload.py".to_string()]);
    }

    #[test]
    fn test_rejects_negative_factor() {
        let text = "[factors.CLT]\na1a3 = -0.4\na4 = 0.1\na5 = 0.0\n";
        assert!(matches!(
            RunConfig::from_toml_str(text),
            Err(LedgerError::InvalidFactor { bucket: "CLT", stage: "A1A3", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            RunConfig::from_toml_str("output_path = ["),
            Err(LedgerError::Config(_))
        ));
    }
}
