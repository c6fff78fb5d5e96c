pub mod batch;
pub mod classifier;
pub mod engine;

pub use crate::domain::model::{CandidateAddress, ValidationResult, ValidationStatus};
pub use crate::domain::ports::{RegistryLookup, Storage, SuggestionLookup};
pub use crate::utils::error::Result;
