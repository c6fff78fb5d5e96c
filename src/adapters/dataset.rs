use crate::domain::model::{CorrectedFields, RegistryLookupResult, Suggestion};
use crate::domain::ports::{RegistryLookup, SuggestionLookup};
use crate::utils::error::{Result, ValidatorError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Confidence for a street that only differs in case, spacing or punctuation.
const FOLDED_MATCH_CONFIDENCE: f64 = 0.95;
/// Confidence for a verbatim street filed under another postal code.
const ZIP_MISMATCH_CONFIDENCE: f64 = 0.9;
/// Fuzzy matches below this similarity count as not found.
const MIN_SIMILARITY: f64 = 0.5;

/// `{ city: { zip: [street, ...] } }`
pub type AddressDataset = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Registry backed by a static street list per city and postal code.
///
/// The dataset has no house numbers, so those are never checked or corrected.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    cities: AddressDataset,
    max_suggestions: usize,
}

struct StreetEntry<'a> {
    zip: &'a str,
    street: &'a str,
}

impl DatasetRegistry {
    pub fn new(cities: AddressDataset) -> Self {
        Self {
            cities,
            max_suggestions: 10,
        }
    }

    pub fn with_max_suggestions(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let registry = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded address dataset with {} cities from {}",
            registry.cities.len(),
            path.as_ref().display()
        );
        Ok(registry)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let cities: AddressDataset = serde_json::from_str(content)?;
        if cities.is_empty() {
            return Err(ValidatorError::ConfigError {
                message: "Address dataset contains no cities".to_string(),
            });
        }
        Ok(Self::new(cities))
    }

    fn find_city(&self, city: &str) -> Option<(&String, &BTreeMap<String, Vec<String>>)> {
        self.cities.get_key_value(city).or_else(|| {
            let wanted = fold(city);
            self.cities.iter().find(|(name, _)| fold(name) == wanted)
        })
    }

    fn entries(zips: &BTreeMap<String, Vec<String>>) -> impl Iterator<Item = StreetEntry<'_>> {
        zips.iter().flat_map(|(zip, streets)| {
            streets.iter().map(move |street| StreetEntry {
                zip: zip.as_str(),
                street: street.as_str(),
            })
        })
    }
}

#[async_trait]
impl RegistryLookup for DatasetRegistry {
    async fn lookup(
        &self,
        street: &str,
        _house_number: &str,
        city: &str,
        zip: &str,
    ) -> Result<RegistryLookupResult> {
        let Some((city_name, zips)) = self.find_city(city) else {
            tracing::debug!("City '{}' not in dataset", city);
            return Ok(RegistryLookupResult::NoMatch);
        };

        if city_name == city
            && zips
                .get(zip)
                .is_some_and(|streets| streets.iter().any(|s| s == street))
        {
            return Ok(RegistryLookupResult::ExactMatch);
        }

        let partial = |entry: &StreetEntry<'_>, confidence: f64| {
            RegistryLookupResult::PartialMatch {
                confidence,
                corrected: CorrectedFields {
                    street_name: Some(entry.street.to_string()),
                    house_number: None,
                    municipality: Some(city_name.clone()),
                    zip: Some(entry.zip.to_string()),
                },
            }
        };

        let wanted = fold(street);
        let folded_matches: Vec<StreetEntry<'_>> = Self::entries(zips)
            .filter(|entry| fold(entry.street) == wanted)
            .collect();

        if let Some(entry) = folded_matches.iter().find(|entry| entry.zip == zip) {
            return Ok(partial(entry, FOLDED_MATCH_CONFIDENCE));
        }
        if let Some(entry) = folded_matches.first() {
            let confidence = if entry.street == street {
                ZIP_MISMATCH_CONFIDENCE
            } else {
                // spelling and postal code both off
                FOLDED_MATCH_CONFIDENCE * ZIP_MISMATCH_CONFIDENCE
            };
            return Ok(partial(entry, confidence));
        }

        let best = Self::entries(zips)
            .map(|entry| (similarity(street, entry.street), entry))
            .fold(None::<(f64, StreetEntry<'_>)>, |best, (score, entry)| match best {
                Some((top, _)) if top >= score => best,
                _ => Some((score, entry)),
            });

        match best {
            Some((score, entry)) if score >= MIN_SIMILARITY => {
                tracing::debug!("Fuzzy match '{}' -> '{}' ({:.2})", street, entry.street, score);
                Ok(partial(&entry, score))
            }
            _ => Ok(RegistryLookupResult::NoMatch),
        }
    }
}

#[async_trait]
impl SuggestionLookup for DatasetRegistry {
    async fn suggest(&self, street: &str, city: &str) -> Result<Vec<Suggestion>> {
        let Some((city_name, zips)) = self.find_city(city) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f64, StreetEntry<'_>)> = Self::entries(zips)
            .map(|entry| (similarity(street, entry.street), entry))
            .collect();
        // stable sort keeps dataset order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(self.max_suggestions)
            .map(|(score, entry)| Suggestion {
                street: entry.street.to_string(),
                house_number: None,
                city: city_name.clone(),
                zip: Some(entry.zip.to_string()),
                confidence: Some((score * 100.0).round() / 100.0),
            })
            .collect())
    }
}

/// Lowercases, drops punctuation and collapses whitespace.
fn fold(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sørensen–Dice coefficient over character bigrams of the folded values.
fn similarity(a: &str, b: &str) -> f64 {
    let bigrams = |value: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = fold(value).chars().filter(|c| !c.is_whitespace()).collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };

    let left = bigrams(a);
    let mut right = bigrams(b);
    if left.is_empty() || right.is_empty() {
        return if fold(a) == fold(b) { 1.0 } else { 0.0 };
    }

    let total = left.len() + right.len();
    let mut shared = 0;
    for pair in &left {
        if let Some(pos) = right.iter().position(|p| p == pair) {
            right.swap_remove(pos);
            shared += 1;
        }
    }

    (2 * shared) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "Brno": {
            "60200": ["Hlavní", "Nádražní", "Masarykova"],
            "60300": ["Husova", "Masarykova"]
        },
        "Praha": {
            "11000": ["Národní", "Na Příkopě"]
        }
    }"#;

    fn registry() -> DatasetRegistry {
        DatasetRegistry::from_json_str(DATASET).unwrap()
    }

    fn corrected(result: RegistryLookupResult) -> (f64, CorrectedFields) {
        match result {
            RegistryLookupResult::PartialMatch {
                confidence,
                corrected,
            } => (confidence, corrected),
            other => panic!("expected partial match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exact_match() {
        let result = registry()
            .lookup("Nádražní", "5", "Brno", "60200")
            .await
            .unwrap();
        assert_eq!(result, RegistryLookupResult::ExactMatch);
    }

    #[tokio::test]
    async fn test_unknown_city_is_no_match() {
        let result = registry()
            .lookup("Hlavní", "1", "Ostrava", "70000")
            .await
            .unwrap();
        assert_eq!(result, RegistryLookupResult::NoMatch);
    }

    #[tokio::test]
    async fn test_case_difference_is_high_confidence() {
        let (confidence, fields) = corrected(
            registry()
                .lookup("hlavní ", "1", "brno", "60200")
                .await
                .unwrap(),
        );

        assert_eq!(confidence, FOLDED_MATCH_CONFIDENCE);
        assert_eq!(fields.street_name.as_deref(), Some("Hlavní"));
        assert_eq!(fields.municipality.as_deref(), Some("Brno"));
        assert_eq!(fields.zip.as_deref(), Some("60200"));
        assert_eq!(fields.house_number, None);
    }

    #[tokio::test]
    async fn test_wrong_zip_is_corrected() {
        let (confidence, fields) = corrected(
            registry()
                .lookup("Husova", "3", "Brno", "60200")
                .await
                .unwrap(),
        );

        assert_eq!(confidence, ZIP_MISMATCH_CONFIDENCE);
        assert_eq!(fields.zip.as_deref(), Some("60300"));
    }

    #[tokio::test]
    async fn test_fuzzy_match_and_unrelated_street() {
        let (confidence, fields) = corrected(
            registry()
                .lookup("Masarykva", "3", "Brno", "60200")
                .await
                .unwrap(),
        );
        assert!(confidence >= MIN_SIMILARITY && confidence < 1.0);
        assert_eq!(fields.street_name.as_deref(), Some("Masarykova"));
        assert_eq!(fields.zip.as_deref(), Some("60200"));

        let result = registry()
            .lookup("Zzzz", "3", "Brno", "60200")
            .await
            .unwrap();
        assert_eq!(result, RegistryLookupResult::NoMatch);
    }

    #[tokio::test]
    async fn test_suggestions_ranked_and_capped() {
        let registry = registry().with_max_suggestions(2);
        let suggestions = registry.suggest("Masaryk", "Brno").await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().all(|s| s.street == "Masarykova"));
        assert_eq!(suggestions[0].zip.as_deref(), Some("60200"));
        assert_eq!(suggestions[1].zip.as_deref(), Some("60300"));
        assert!(registry.suggest("Masaryk", "Ostrava").await.unwrap().is_empty());
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("Husova", "husova"), 1.0);
        assert_eq!(similarity("Husova", "Národní"), 0.0);
        assert_eq!(similarity("A", "a"), 1.0);
        let partial = similarity("Masarykva", "Masarykova");
        assert!(partial > 0.8 && partial < 1.0);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(DatasetRegistry::from_json_str("{}").is_err());
    }
}
