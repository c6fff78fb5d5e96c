pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{DatasetRegistry, LocalStorage, RegistryClient};
pub use config::ValidatorConfig;
pub use crate::core::{
    batch::BatchValidator, classifier::AddressClassifier, engine::BatchEngine,
};
pub use domain::model::{
    CandidateAddress, CorrectedFields, NormalizedAddress, RegistryLookupResult, Suggestion,
    ValidationResult, ValidationStatus,
};
pub use utils::error::{Result, ValidatorError};
