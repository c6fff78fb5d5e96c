use crate::utils::error::{Result, ValidatorError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_THRESHOLD: f64 = 0.85;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

pub const THRESHOLD_ENV: &str = "ADDRESS_VALIDATOR_THRESHOLD";
pub const ENDPOINT_ENV: &str = "ADDRESS_VALIDATOR_REGISTRY_ENDPOINT";

const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_threshold")]
    pub auto_correct_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            auto_correct_threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    #[default]
    Http,
    Dataset,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub kind: RegistryKind,
    pub endpoint: Option<String>,
    pub dataset_path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_suggestions: Option<usize>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub concurrent_requests: Option<usize>,
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl ValidatorConfig {
    /// Reads, applies environment overrides and validates.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ValidatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ValidatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(THRESHOLD_ENV) {
            let threshold = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| ValidatorError::InvalidConfigValueError {
                    field: THRESHOLD_ENV.to_string(),
                    value: raw.clone(),
                    reason: format!("Not a number: {}", e),
                })?;
            tracing::debug!("Threshold overridden from environment: {}", threshold);
            self.classifier.auto_correct_threshold = threshold;
        }

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            tracing::debug!("Registry endpoint overridden from environment");
            self.registry.endpoint = Some(endpoint);
        }

        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_range(
            "classifier.auto_correct_threshold",
            self.classifier.auto_correct_threshold,
            0.0,
            1.0,
        )?;

        match self.registry.kind {
            RegistryKind::Http => {
                let endpoint =
                    validation::validate_required_field("registry.endpoint", &self.registry.endpoint)?;
                validation::validate_url("registry.endpoint", endpoint)?;
            }
            RegistryKind::Dataset => {
                let path = validation::validate_required_field(
                    "registry.dataset_path",
                    &self.registry.dataset_path,
                )?;
                validation::validate_path("registry.dataset_path", path)?;
            }
        }

        if let Some(timeout) = self.registry.timeout_seconds {
            validation::validate_positive_number("registry.timeout_seconds", timeout as usize, 1)?;
        }

        validation::validate_range(
            "batch.concurrent_requests",
            self.concurrent_requests(),
            1,
            100,
        )?;

        if let Some(path) = &self.batch.output_path {
            validation::validate_path("batch.output_path", path)?;
        }

        for format in self.output_formats() {
            if !OUTPUT_FORMATS.contains(&format.as_str()) {
                return Err(ValidatorError::InvalidConfigValueError {
                    field: "batch.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        OUTPUT_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        self.classifier.auto_correct_threshold
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.registry
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn max_suggestions(&self) -> usize {
        self.registry
            .max_suggestions
            .unwrap_or(DEFAULT_MAX_SUGGESTIONS)
    }

    pub fn concurrent_requests(&self) -> usize {
        self.batch
            .concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    pub fn output_path(&self) -> &str {
        self.batch.output_path.as_deref().unwrap_or("./output")
    }

    pub fn output_formats(&self) -> Vec<String> {
        self.batch
            .output_formats
            .clone()
            .unwrap_or_else(|| OUTPUT_FORMATS.iter().map(|f| f.to_string()).collect())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl Validate for ValidatorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
