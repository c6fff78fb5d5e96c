use serde::{Deserialize, Serialize};
use std::fmt;

/// Address as supplied by the caller. Fields are free text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateAddress {
    pub name: String,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

/// Address returned to the caller, possibly with registry corrections applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedAddress {
    pub name: String,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

impl From<&CandidateAddress> for NormalizedAddress {
    fn from(candidate: &CandidateAddress) -> Self {
        Self {
            name: candidate.name.clone(),
            street: candidate.street.clone(),
            house_number: candidate.house_number.clone(),
            city: candidate.city.clone(),
            zip: candidate.zip.clone(),
            country: candidate.country.clone(),
        }
    }
}

/// Fields the registry managed to resolve for a partial match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedFields {
    pub street_name: Option<String>,
    pub house_number: Option<String>,
    pub municipality: Option<String>,
    pub zip: Option<String>,
}

impl CorrectedFields {
    /// Picks the corrected value unless it is missing or blank.
    pub fn resolve(original: &str, corrected: Option<&str>) -> String {
        match corrected {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => original.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.street_name,
            &self.house_number,
            &self.municipality,
            &self.zip,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Overlays the corrections onto the candidate. Name and country are
    /// always the caller's.
    pub fn apply_to(&self, candidate: &CandidateAddress) -> NormalizedAddress {
        NormalizedAddress {
            name: candidate.name.clone(),
            street: Self::resolve(&candidate.street, self.street_name.as_deref()),
            house_number: Self::resolve(&candidate.house_number, self.house_number.as_deref()),
            city: Self::resolve(&candidate.city, self.municipality.as_deref()),
            zip: Self::resolve(&candidate.zip, self.zip.as_deref()),
            country: candidate.country.clone(),
        }
    }
}

/// Outcome of a single registry lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryLookupResult {
    NoMatch,
    ExactMatch,
    PartialMatch {
        confidence: f64,
        corrected: CorrectedFields,
    },
}

/// Alternative address offered by the registry when a match is uncertain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Valid,
    Corrected,
    Ambiguous,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::Corrected => "CORRECTED",
            ValidationStatus::Ambiguous => "AMBIGUOUS",
            ValidationStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome. Build it through the constructors so the
/// status/address pairing always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<NormalizedAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

impl ValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Invalid,
            address: None,
            message: Some(message.into()),
            suggestions: Vec::new(),
        }
    }

    pub fn valid(address: NormalizedAddress) -> Self {
        Self {
            status: ValidationStatus::Valid,
            address: Some(address),
            message: None,
            suggestions: Vec::new(),
        }
    }

    pub fn corrected(address: NormalizedAddress, message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Corrected,
            address: Some(address),
            message: Some(message.into()),
            suggestions: Vec::new(),
        }
    }

    pub fn ambiguous(
        address: NormalizedAddress,
        message: impl Into<String>,
        suggestions: Vec<Suggestion>,
    ) -> Self {
        Self {
            status: ValidationStatus::Ambiguous,
            address: Some(address),
            message: Some(message.into()),
            suggestions,
        }
    }

    /// True when the returned address can be shipped to as-is.
    pub fn is_deliverable(&self) -> bool {
        matches!(
            self.status,
            ValidationStatus::Valid | ValidationStatus::Corrected
        )
    }
}
