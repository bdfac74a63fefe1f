//! Run configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the standard run: embedded Iris, 20% stratified test split with
//! seed 42, a 4-10-5-3 network trained for 100 epochs, both heatmaps written
//! to the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::train::train_config::TrainConfig;

/// Environment variable naming a JSON config file for the binary.
pub const CONFIG_ENV: &str = "IRIS_MLP_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV to read instead of the embedded dataset.
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub svg: bool,
    pub png: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: PathBuf::from("."),
            svg: true,
            png: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub split: SplitConfig,
    pub train: TrainConfig,
    pub report: ReportConfig,
}

impl PipelineConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a config from a JSON file. Missing fields
    /// keep their defaults.
    pub fn load_json(path: &Path) -> Result<PipelineConfig> {
        let file = std::fs::File::open(path).map_err(|e| {
            PipelineError::Config(format!("cannot open '{}': {}", path.display(), e))
        })?;
        let reader = std::io::BufReader::new(file);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `IRIS_MLP_CONFIG`, or the defaults when the
    /// variable is unset or empty.
    pub fn from_env() -> Result<PipelineConfig> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => PipelineConfig::load_json(Path::new(&path)),
            _ => Ok(PipelineConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "split.test_fraction must be in (0, 1), got {}",
                fraction
            )));
        }
        if self.train.epochs == 0 {
            return Err(PipelineError::InvalidParameter("train.epochs must be at least 1".into()));
        }
        if self.train.batch_size == 0 {
            return Err(PipelineError::InvalidParameter(
                "train.batch_size must be at least 1".into(),
            ));
        }
        if !(self.train.learning_rate > 0.0 && self.train.learning_rate.is_finite()) {
            return Err(PipelineError::InvalidParameter(format!(
                "train.learning_rate must be positive, got {}",
                self.train.learning_rate
            )));
        }
        if self.train.hidden1 == 0 || self.train.hidden2 == 0 {
            return Err(PipelineError::InvalidParameter(
                "hidden layer widths must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_standard_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.data.csv_path, None);
        assert_eq!(config.split.test_fraction, 0.2);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.train.epochs, 100);
        assert_eq!(config.train.batch_size, 16);
        assert_eq!(config.train.learning_rate, 0.01);
        assert_eq!(config.train.seed, None);
        assert_eq!(config.report.output_dir, PathBuf::from("."));
        assert!(config.report.svg && config.report.png);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"train": {{"epochs": 5, "seed": 3}}, "report": {{"png": false}}}}"#).unwrap();

        let config = PipelineConfig::load_json(file.path()).unwrap();
        assert_eq!(config.train.epochs, 5);
        assert_eq!(config.train.seed, Some(3));
        assert_eq!(config.train.batch_size, 16);
        assert!(!config.report.png);
        assert!(config.report.svg);
        assert_eq!(config.split, SplitConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut config = PipelineConfig::default();
        config.split.seed = 7;
        config.data.csv_path = Some(PathBuf::from("other.csv"));
        config.save_json(&path).unwrap();
        assert_eq!(PipelineConfig::load_json(&path).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = PipelineConfig::default();
        config.split.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidParameter(_))));

        let mut config = PipelineConfig::default();
        config.train.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.train.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.train.epochs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            PipelineConfig::load_json(file.path()),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = PipelineConfig::load_json(Path::new("/nonexistent/iris-mlp.json")).unwrap_err();
        assert!(err.to_string().contains("iris-mlp.json"));
    }
}
