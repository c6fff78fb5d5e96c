pub mod toml_config;

pub use toml_config::{RegistryKind, ValidatorConfig};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Flags of the single-address CLI. Values given here override the TOML file.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "address-validator")]
#[command(about = "Validate a postal address against the address registry")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "validator.toml")]
    pub config: String,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long)]
    pub street: String,

    #[arg(long, default_value = "")]
    pub house_number: String,

    #[arg(long)]
    pub city: String,

    #[arg(long, default_value = "")]
    pub zip: String,

    #[arg(long, default_value = "CZ")]
    pub country: String,

    /// Override classifier.auto_correct_threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Use the HTTP registry at this URL
    #[arg(long, conflicts_with = "dataset")]
    pub endpoint: Option<String>,

    /// Use an offline JSON dataset instead of the HTTP registry
    #[arg(long)]
    pub dataset: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file when present (defaults otherwise) and layers flags on top.
    pub fn resolve(&self) -> crate::utils::error::Result<ValidatorConfig> {
        use crate::utils::validation::Validate;

        let mut config = if std::path::Path::new(&self.config).exists() {
            ValidatorConfig::from_file(&self.config)?
        } else {
            tracing::debug!("No config file at {}, using defaults", self.config);
            ValidatorConfig::default()
        };
        config.apply_env_overrides()?;

        if let Some(threshold) = self.threshold {
            config.classifier.auto_correct_threshold = threshold;
        }
        if let Some(endpoint) = &self.endpoint {
            config.registry.kind = RegistryKind::Http;
            config.registry.endpoint = Some(endpoint.clone());
        }
        if let Some(dataset) = &self.dataset {
            config.registry.kind = RegistryKind::Dataset;
            config.registry.dataset_path = Some(dataset.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn candidate(&self) -> crate::domain::model::CandidateAddress {
        crate::domain::model::CandidateAddress {
            name: self.name.clone(),
            street: self.street.clone(),
            house_number: self.house_number.clone(),
            city: self.city.clone(),
            zip: self.zip.clone(),
            country: self.country.clone(),
        }
    }
}
