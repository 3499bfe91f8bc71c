use crate::core::ions::params::{IonParameters, ParamLoadError};
use crate::core::ions::valence::DEFAULT_SILENT_DONORS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONTACT_CUTOFF: f64 = 3.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Contact cutoff must be positive, got {0}")]
    InvalidCutoff(f64),
}

fn default_contact_cutoff() -> f64 {
    DEFAULT_CONTACT_CUTOFF
}

fn default_silent_donors() -> Vec<String> {
    DEFAULT_SILENT_DONORS.iter().map(|e| e.to_string()).collect()
}

/// Settings for scoring the ions of a structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// TOML parameter table; the bundled table when absent.
    #[serde(default)]
    pub parameters_path: Option<PathBuf>,
    /// CSV file replacing the bond-valence rows of the parameter table.
    #[serde(default)]
    pub valence_table_path: Option<PathBuf>,
    /// Maximum ion-donor distance considered, in Angstroms.
    #[serde(default = "default_contact_cutoff")]
    pub contact_cutoff: f64,
    /// Donor elements that may contribute nothing without being reported.
    #[serde(default = "default_silent_donors")]
    pub silent_donor_elements: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            parameters_path: None,
            valence_table_path: None,
            contact_cutoff: DEFAULT_CONTACT_CUTOFF,
            silent_donor_elements: default_silent_donors(),
        }
    }
}

impl ScoringConfig {
    /// Reads a configuration file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    fn from_toml_str(content: &str, label: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: label.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Also rejects NaN.
        if !(self.contact_cutoff > 0.0) {
            return Err(ConfigError::InvalidCutoff(self.contact_cutoff));
        }
        Ok(())
    }

    /// Loads the parameter table these settings point at.
    pub fn load_parameters(&self) -> Result<IonParameters, ParamLoadError> {
        let params = match &self.parameters_path {
            Some(path) => IonParameters::load(path)?,
            None => IonParameters::bundled()?,
        };
        match &self.valence_table_path {
            Some(csv_path) => params.with_valence_csv(csv_path),
            None => Ok(params),
        }
    }
}

#[derive(Default)]
pub struct ScoringConfigBuilder {
    parameters_path: Option<PathBuf>,
    valence_table_path: Option<PathBuf>,
    contact_cutoff: Option<f64>,
    silent_donor_elements: Option<Vec<String>>,
}

impl ScoringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters_path(mut self, path: PathBuf) -> Self {
        self.parameters_path = Some(path);
        self
    }
    pub fn valence_table_path(mut self, path: PathBuf) -> Self {
        self.valence_table_path = Some(path);
        self
    }
    pub fn contact_cutoff(mut self, cutoff: f64) -> Self {
        self.contact_cutoff = Some(cutoff);
        self
    }
    pub fn silent_donor_elements(mut self, elements: Vec<String>) -> Self {
        self.silent_donor_elements = Some(elements);
        self
    }

    pub fn build(self) -> Result<ScoringConfig, ConfigError> {
        let config = ScoringConfig {
            parameters_path: self.parameters_path,
            valence_table_path: self.valence_table_path,
            contact_cutoff: self.contact_cutoff.unwrap_or(DEFAULT_CONTACT_CUTOFF),
            silent_donor_elements: self
                .silent_donor_elements
                .unwrap_or_else(default_silent_donors),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builder_applies_defaults() {
        let config = ScoringConfigBuilder::new().build().unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert_eq!(config.contact_cutoff, 3.0);
        assert_eq!(config.silent_donor_elements, vec!["H", "C", "AX"]);
    }

    #[test]
    fn builder_rejects_non_positive_cutoff() {
        let result = ScoringConfigBuilder::new().contact_cutoff(0.0).build();
        assert!(matches!(result, Err(ConfigError::InvalidCutoff(c)) if c == 0.0));
        assert!(ScoringConfigBuilder::new().contact_cutoff(f64::NAN).build().is_err());
    }

    #[test]
    fn builder_keeps_explicit_values() {
        let config = ScoringConfigBuilder::new()
            .contact_cutoff(2.5)
            .silent_donor_elements(vec!["H".to_string()])
            .parameters_path(PathBuf::from("ions.toml"))
            .build()
            .unwrap();
        assert_eq!(config.contact_cutoff, 2.5);
        assert_eq!(config.silent_donor_elements, vec!["H"]);
        assert_eq!(config.parameters_path, Some(PathBuf::from("ions.toml")));
        assert_eq!(config.valence_table_path, None);
    }

    #[test]
    fn from_toml_file_fills_missing_keys_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "contact_cutoff = 2.8\n").unwrap();
        let config = ScoringConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.contact_cutoff, 2.8);
        assert_eq!(config.silent_donor_elements, vec!["H", "C", "AX"]);
        assert_eq!(config.parameters_path, None);
    }

    #[test]
    fn from_toml_file_rejects_unknown_keys_and_bad_cutoff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cutoff = 2.8\n").unwrap();
        assert!(matches!(
            ScoringConfig::from_toml_file(&path),
            Err(ConfigError::Toml { .. })
        ));
        fs::write(&path, "contact_cutoff = -1.0\n").unwrap();
        assert!(matches!(
            ScoringConfig::from_toml_file(&path),
            Err(ConfigError::InvalidCutoff(_))
        ));
    }

    #[test]
    fn from_toml_file_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = ScoringConfig::from_toml_file(&dir.path().join("none.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_parameters_defaults_to_bundled_table() {
        let params = ScoringConfig::default().load_parameters().unwrap();
        assert!(params.get_metal_parameters("ZN").is_some());
    }

    #[test]
    fn load_parameters_applies_valence_csv_to_bundled_table() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("valence.csv");
        fs::write(
            &csv_path,
            "atom_symbol,atom_charge,donor_symbol,donor_charge,value,b\nZN,2,O,-2,1.704,0.37\n",
        )
        .unwrap();
        let config = ScoringConfigBuilder::new()
            .valence_table_path(csv_path)
            .build()
            .unwrap();

        let params = config.load_parameters().unwrap();
        assert_eq!(params.valence_rows().len(), 1);
        assert!(params.get_metal_parameters("CA").is_some());
        assert!(!params.is_supported_element("CA"));
    }

    #[test]
    fn load_parameters_fails_for_missing_table() {
        let config = ScoringConfigBuilder::new()
            .parameters_path(PathBuf::from("/nonexistent/ions.toml"))
            .build()
            .unwrap();
        assert!(matches!(
            config.load_parameters(),
            Err(ParamLoadError::MissingFile { .. })
        ));
    }
}
