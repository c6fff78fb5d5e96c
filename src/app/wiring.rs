use crate::adapters::{DatasetRegistry, RegistryClient};
use crate::config::{RegistryKind, ValidatorConfig};
use crate::core::classifier::AddressClassifier;
use crate::domain::ports::{RegistryLookup, SuggestionLookup};
use crate::utils::error::{Result, ValidatorError};
use std::sync::Arc;

pub type SharedLookup = Arc<dyn RegistryLookup>;
pub type SharedSuggestions = Arc<dyn SuggestionLookup>;
pub type ConfiguredClassifier = AddressClassifier<SharedLookup, SharedSuggestions>;

/// Builds the registry backend named in the config. The same instance serves
/// both lookups and suggestions.
pub fn build_registry(config: &ValidatorConfig) -> Result<(SharedLookup, SharedSuggestions)> {
    match config.registry.kind {
        RegistryKind::Http => {
            let endpoint =
                config
                    .registry
                    .endpoint
                    .clone()
                    .ok_or_else(|| ValidatorError::MissingConfigError {
                        field: "registry.endpoint".to_string(),
                    })?;
            tracing::info!("Using HTTP address registry at {}", endpoint);
            let client = Arc::new(
                RegistryClient::new(endpoint)
                    .with_headers(config.registry.headers.clone().unwrap_or_default())
                    .with_timeout(config.timeout()),
            );
            let lookup: SharedLookup = client.clone();
            let suggestions: SharedSuggestions = client;
            Ok((lookup, suggestions))
        }
        RegistryKind::Dataset => {
            let path = config.registry.dataset_path.as_deref().ok_or_else(|| {
                ValidatorError::MissingConfigError {
                    field: "registry.dataset_path".to_string(),
                }
            })?;
            let dataset = Arc::new(
                DatasetRegistry::from_file(path)?.with_max_suggestions(config.max_suggestions()),
            );
            let lookup: SharedLookup = dataset.clone();
            let suggestions: SharedSuggestions = dataset;
            Ok((lookup, suggestions))
        }
    }
}

pub fn build_classifier(config: &ValidatorConfig) -> Result<ConfiguredClassifier> {
    let (lookup, suggestions) = build_registry(config)?;
    Ok(AddressClassifier::new(
        lookup,
        suggestions,
        config.threshold(),
    ))
}
