use crate::core::classifier::AddressClassifier;
use crate::domain::model::{CandidateAddress, ValidationResult, ValidationStatus};
use crate::domain::ports::{RegistryLookup, SuggestionLookup};
use crate::utils::error::{Result, ValidatorError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// One input row and what happened to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub row: usize,
    pub candidate: CandidateAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub valid: usize,
    pub corrected: usize,
    pub ambiguous: usize,
    pub invalid: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub counts: StatusCounts,
    pub threshold: f64,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub records: Vec<BatchRecord>,
}

impl StatusCounts {
    fn record(&mut self, record: &BatchRecord) {
        match record.result.as_ref().map(|r| r.status) {
            Some(ValidationStatus::Valid) => self.valid += 1,
            Some(ValidationStatus::Corrected) => self.corrected += 1,
            Some(ValidationStatus::Ambiguous) => self.ambiguous += 1,
            Some(ValidationStatus::Invalid) => self.invalid += 1,
            None => self.failed += 1,
        }
    }
}

/// Runs the classifier over many candidates with bounded concurrency.
/// Records come back in input order; a failed row never aborts the batch.
pub struct BatchValidator<L: RegistryLookup, S: SuggestionLookup> {
    classifier: Arc<AddressClassifier<L, S>>,
    concurrency: usize,
}

impl<L, S> BatchValidator<L, S>
where
    L: RegistryLookup + 'static,
    S: SuggestionLookup + 'static,
{
    pub fn new(classifier: AddressClassifier<L, S>, concurrency: usize) -> Self {
        Self {
            classifier: Arc::new(classifier),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, candidates: Vec<CandidateAddress>) -> BatchReport {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        tracing::info!(
            "Validating {} addresses ({} concurrent)",
            candidates.len(),
            self.concurrency
        );

        let handles: Vec<_> = candidates
            .into_iter()
            .map(|candidate| {
                let classifier = Arc::clone(&self.classifier);
                let semaphore = Arc::clone(&semaphore);
                let task_candidate = candidate.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        ValidatorError::ProcessingError {
                            message: format!("Concurrency limiter closed: {}", e),
                        }
                    })?;
                    classifier.classify(&task_candidate).await
                });
                (candidate, handle)
            })
            .collect();

        let mut records = Vec::with_capacity(handles.len());
        let mut counts = StatusCounts::default();

        for (row, (candidate, handle)) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ValidatorError::ProcessingError {
                    message: format!("Validation task failed: {}", e),
                }),
            };

            let record = match outcome {
                Ok(result) => BatchRecord {
                    row,
                    candidate,
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    tracing::error!("Row {} failed: {}", row, e);
                    BatchRecord {
                        row,
                        candidate,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            counts.record(&record);
            records.push(record);
        }

        let summary = BatchSummary {
            total: records.len(),
            counts,
            threshold: self.classifier.threshold(),
            generated_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Batch done: {} valid, {} corrected, {} ambiguous, {} invalid, {} failed",
            summary.counts.valid,
            summary.counts.corrected,
            summary.counts.ambiguous,
            summary.counts.invalid,
            summary.counts.failed
        );

        BatchReport { summary, records }
    }
}

/// Reads candidates from CSV with a `name,street,house_number,city,zip,country` header.
/// Missing columns are read as empty.
pub fn parse_candidates_csv(data: &[u8]) -> Result<Vec<CandidateAddress>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(data);

    reader
        .deserialize::<CandidateAddress>()
        .map(|row| row.map_err(ValidatorError::from))
        .collect()
}

pub fn parse_candidates_json(data: &[u8]) -> Result<Vec<CandidateAddress>> {
    Ok(serde_json::from_slice(data)?)
}

pub fn report_to_json(report: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// One line per input row. Address columns hold the normalized address when
/// there is one, otherwise the candidate.
pub fn report_to_csv(report: &BatchReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "row",
        "status",
        "name",
        "street",
        "house_number",
        "city",
        "zip",
        "country",
        "message",
        "suggestions",
        "error",
    ])?;

    for record in &report.records {
        let status = record
            .result
            .as_ref()
            .map(|r| r.status.as_str())
            .unwrap_or("ERROR");
        let address = record.result.as_ref().and_then(|r| r.address.as_ref());
        let field = |normalized: Option<&String>, original: &String| -> String {
            normalized.unwrap_or(original).clone()
        };
        let suggestions = record
            .result
            .as_ref()
            .map(|r| {
                r.suggestions
                    .iter()
                    .map(|s| match &s.zip {
                        Some(zip) => format!("{}, {} {}", s.street, zip, s.city),
                        None => format!("{}, {}", s.street, s.city),
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();

        writer.write_record([
            record.row.to_string(),
            status.to_string(),
            field(address.map(|a| &a.name), &record.candidate.name),
            field(address.map(|a| &a.street), &record.candidate.street),
            field(address.map(|a| &a.house_number), &record.candidate.house_number),
            field(address.map(|a| &a.city), &record.candidate.city),
            field(address.map(|a| &a.zip), &record.candidate.zip),
            field(address.map(|a| &a.country), &record.candidate.country),
            record
                .result
                .as_ref()
                .and_then(|r| r.message.clone())
                .unwrap_or_default(),
            suggestions,
            record.error.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ValidatorError::ProcessingError {
            message: format!("Failed to flush CSV output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| ValidatorError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CorrectedFields, RegistryLookupResult, Suggestion};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers by street name; unknown streets fail like a broken registry.
    struct ScriptedRegistry {
        answers: HashMap<String, RegistryLookupResult>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedRegistry {
        fn new(answers: Vec<(&str, RegistryLookupResult)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(street, result)| (street.to_string(), result))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RegistryLookup for ScriptedRegistry {
        async fn lookup(
            &self,
            street: &str,
            _house_number: &str,
            _city: &str,
            _zip: &str,
        ) -> Result<RegistryLookupResult> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.answers
                .get(street)
                .cloned()
                .ok_or_else(|| ValidatorError::RegistryError {
                    status: 502,
                    message: format!("no answer for {}", street),
                })
        }
    }

    #[async_trait]
    impl SuggestionLookup for ScriptedRegistry {
        async fn suggest(&self, _street: &str, city: &str) -> Result<Vec<Suggestion>> {
            Ok(vec![Suggestion {
                street: "Hlavní".to_string(),
                city: city.to_string(),
                zip: Some("60200".to_string()),
                ..Default::default()
            }])
        }
    }

    fn candidate(street: &str) -> CandidateAddress {
        CandidateAddress {
            name: "Customer".to_string(),
            street: street.to_string(),
            house_number: "1".to_string(),
            city: "Brno".to_string(),
            zip: "60200".to_string(),
            country: "CZ".to_string(),
        }
    }

    fn scripted() -> Arc<ScriptedRegistry> {
        Arc::new(ScriptedRegistry::new(vec![
            ("Exact", RegistryLookupResult::ExactMatch),
            ("Missing", RegistryLookupResult::NoMatch),
            (
                "Typo",
                RegistryLookupResult::PartialMatch {
                    confidence: 0.9,
                    corrected: CorrectedFields {
                        street_name: Some("Fixed".to_string()),
                        ..Default::default()
                    },
                },
            ),
            (
                "Vague",
                RegistryLookupResult::PartialMatch {
                    confidence: 0.3,
                    corrected: CorrectedFields::default(),
                },
            ),
        ]))
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_counts() {
        let registry = scripted();
        let classifier = AddressClassifier::new(registry.clone(), registry.clone(), 0.85);
        let validator = BatchValidator::new(classifier, 2);

        let streets = ["Vague", "Exact", "Broken", "Typo", "Missing", "Exact"];
        let report = validator
            .run(streets.iter().map(|s| candidate(s)).collect())
            .await;

        assert_eq!(report.summary.total, 6);
        assert_eq!(
            report.summary.counts,
            StatusCounts {
                valid: 2,
                corrected: 1,
                ambiguous: 1,
                invalid: 1,
                failed: 1,
            }
        );
        for (i, record) in report.records.iter().enumerate() {
            assert_eq!(record.row, i);
            assert_eq!(record.candidate.street, streets[i]);
        }
        assert!(report.records[2].error.as_ref().unwrap().contains("502"));
        assert_eq!(
            report.records[3].result.as_ref().unwrap().address.as_ref().unwrap().street,
            "Fixed"
        );
        assert!(registry.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_csv_round_trip_of_candidates_and_report() {
        let input = b"name,street,house_number,city,zip,country\n\
            Jan,Typo,1,Brno,60200,CZ\n\
            Eva,Vague,2,Brno,60200,CZ\n";
        let candidates = parse_candidates_csv(input).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].name, "Eva");

        let registry = scripted();
        let classifier = AddressClassifier::new(registry.clone(), registry, 0.85);
        let report = BatchValidator::new(classifier, 4).run(candidates).await;
        let csv_output = report_to_csv(&report).unwrap();
        let lines: Vec<&str> = csv_output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("row,status,name,street"));
        assert!(lines[1].starts_with("0,CORRECTED,Jan,Fixed,1,Brno,60200,CZ"));
        assert!(lines[2].starts_with("1,AMBIGUOUS,Eva,Vague"));
        assert!(lines[2].contains("\"Hlavní, 60200 Brno\""));
    }

    #[test]
    fn test_parse_csv_with_missing_columns() {
        let candidates = parse_candidates_csv(b"street,city\nMain St,Springfield\n").unwrap();
        assert_eq!(candidates[0].street, "Main St");
        assert_eq!(candidates[0].zip, "");
    }

    #[test]
    fn test_parse_json_candidates() {
        let candidates =
            parse_candidates_json(br#"[{"street": "Main St", "city": "Springfield", "zip": "12345"}]"#)
                .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].zip, "12345");
    }
}
