//! Configuration management for the diabetes risk calculator

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Feature scaling applied before inference
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Apply the scaler fit at training time (requires `scaler_path`)
    #[default]
    Fitted,
    /// Refit a scaler on every single request sample (always yields zeros)
    PerSample,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Name used in logs
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Path to the ONNX classifier
    pub model_path: String,
    /// Path to the JSON scaler parameters (used with `fitted` scaling)
    #[serde(default)]
    pub scaler_path: Option<String>,
    /// Feature scaling mode: "fitted" or "per_sample"
    #[serde(default)]
    pub scaling: ScalingMode,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_name() -> String {
    "lightgbm".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    ///
    /// `DIABETES_RISK__SECTION__KEY` environment variables override the file,
    /// e.g. `DIABETES_RISK__MODEL__SCALING=per_sample`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("DIABETES_RISK").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                name: default_model_name(),
                model_path: "models/diabetes_lightgbm.onnx".to_string(),
                scaler_path: Some("models/scaler.json".to_string()),
                scaling: ScalingMode::Fitted,
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.scaling, ScalingMode::Fitted);
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.model.scaler_path.as_deref(), Some("models/scaler.json"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[model]
model_path = "artifacts/model.onnx"
scaling = "per_sample"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.model_path, "artifacts/model.onnx");
        assert_eq!(config.model.scaling, ScalingMode::PerSample);
        assert_eq!(config.model.scaler_path, None);
        assert_eq!(config.model.name, "lightgbm");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_unknown_scaling_mode_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[model]
model_path = "m.onnx"
scaling = "none"

[logging]
level = "info"
format = "pretty"
"#
        )
        .unwrap();

        assert!(AppConfig::load_from_path(file.path()).is_err());
    }
}
