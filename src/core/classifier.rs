use crate::domain::model::{
    CandidateAddress, NormalizedAddress, RegistryLookupResult, ValidationResult,
};
use crate::domain::ports::{RegistryLookup, SuggestionLookup};
use crate::utils::error::Result;

pub const NOT_FOUND_MESSAGE: &str =
    "Street not found in address registry. Please verify the address.";
pub const REVIEW_MESSAGE: &str = "Multiple possible addresses found - please review";

/// Classifies a candidate address from a single registry lookup.
///
/// ```text
/// NoMatch                    -> INVALID
/// ExactMatch                 -> VALID
/// PartialMatch, c >= thresh  -> CORRECTED (registry values overlaid)
/// PartialMatch, c <  thresh  -> AMBIGUOUS (suggestions attached)
/// ```
///
/// Lookup failures are returned untouched; nothing is retried.
pub struct AddressClassifier<L: RegistryLookup, S: SuggestionLookup> {
    lookup: L,
    suggestions: S,
    threshold: f64,
}

impl<L: RegistryLookup, S: SuggestionLookup> AddressClassifier<L, S> {
    /// `threshold` is expected to be in [0, 1]; range checks belong to config loading.
    pub fn new(lookup: L, suggestions: S, threshold: f64) -> Self {
        Self {
            lookup,
            suggestions,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub async fn classify(&self, candidate: &CandidateAddress) -> Result<ValidationResult> {
        tracing::debug!(
            "Looking up '{} {}', {} {}",
            candidate.street,
            candidate.house_number,
            candidate.zip,
            candidate.city
        );

        let lookup = self
            .lookup
            .lookup(
                &candidate.street,
                &candidate.house_number,
                &candidate.city,
                &candidate.zip,
            )
            .await?;

        let result = match lookup {
            RegistryLookupResult::NoMatch => ValidationResult::invalid(NOT_FOUND_MESSAGE),
            RegistryLookupResult::ExactMatch => {
                ValidationResult::valid(NormalizedAddress::from(candidate))
            }
            RegistryLookupResult::PartialMatch {
                confidence,
                corrected,
            } if confidence >= self.threshold => {
                if corrected.is_empty() {
                    tracing::debug!("Partial match carried no corrections, keeping candidate values");
                }
                ValidationResult::corrected(
                    corrected.apply_to(candidate),
                    format!(
                        "Auto-corrected by address registry (confidence {}%)",
                        confidence_percent(confidence)
                    ),
                )
            }
            RegistryLookupResult::PartialMatch { confidence, .. } => {
                tracing::warn!(
                    "Confidence {:.2} below threshold {:.2}, fetching suggestions",
                    confidence,
                    self.threshold
                );
                let suggestions = self
                    .suggestions
                    .suggest(&candidate.street, &candidate.city)
                    .await?;
                ValidationResult::ambiguous(
                    NormalizedAddress::from(candidate),
                    REVIEW_MESSAGE,
                    suggestions,
                )
            }
        };

        tracing::info!("Address classified as {}", result.status);
        Ok(result)
    }
}

/// Rounds half-up to a whole percent.
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().max(0.0) as u32
}
