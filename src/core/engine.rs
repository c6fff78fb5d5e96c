use crate::core::batch::{
    parse_candidates_csv, parse_candidates_json, report_to_csv, report_to_json, BatchReport,
    BatchValidator,
};
use crate::domain::model::CandidateAddress;
use crate::domain::ports::{RegistryLookup, SuggestionLookup, Storage};
use crate::utils::error::Result;
use crate::utils::validation::validate_file_extensions;

pub const JSON_OUTPUT: &str = "results.json";
pub const CSV_OUTPUT: &str = "results.csv";
pub const SUMMARY_OUTPUT: &str = "summary.json";

#[derive(Debug)]
pub struct BatchOutcome {
    pub report: BatchReport,
    pub written: Vec<String>,
}

/// Reads candidates from storage, validates them and writes the report files.
pub struct BatchEngine<St: Storage, L: RegistryLookup, S: SuggestionLookup> {
    storage: St,
    validator: BatchValidator<L, S>,
    output_formats: Vec<String>,
}

impl<St, L, S> BatchEngine<St, L, S>
where
    St: Storage,
    L: RegistryLookup + 'static,
    S: SuggestionLookup + 'static,
{
    pub fn new(storage: St, validator: BatchValidator<L, S>, output_formats: Vec<String>) -> Self {
        Self {
            storage,
            validator,
            output_formats,
        }
    }

    pub async fn extract(&self, input: &str) -> Result<Vec<CandidateAddress>> {
        validate_file_extensions("input", &[input.to_string()], &["csv", "json"])?;

        let data = self.storage.read_file(input).await?;
        let candidates = if input.ends_with(".json") {
            parse_candidates_json(&data)?
        } else {
            parse_candidates_csv(&data)?
        };

        tracing::info!("Read {} addresses from {}", candidates.len(), input);
        Ok(candidates)
    }

    pub async fn load(&self, report: &BatchReport) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in &self.output_formats {
            let (name, content) = match format.as_str() {
                "json" => (JSON_OUTPUT, report_to_json(report)?),
                "csv" => (CSV_OUTPUT, report_to_csv(report)?),
                other => {
                    tracing::warn!("Skipping unknown output format '{}'", other);
                    continue;
                }
            };
            self.storage.write_file(name, content.as_bytes()).await?;
            tracing::debug!("Wrote {} ({} bytes)", name, content.len());
            written.push(name.to_string());
        }

        let summary = serde_json::to_string_pretty(&report.summary)?;
        self.storage
            .write_file(SUMMARY_OUTPUT, summary.as_bytes())
            .await?;
        written.push(SUMMARY_OUTPUT.to_string());

        Ok(written)
    }

    pub async fn run(&self, input: &str) -> Result<BatchOutcome> {
        let candidates = self.extract(input).await?;
        let report = self.validator.run(candidates).await;
        let written = self.load(&report).await?;

        tracing::info!(
            "Batch of {} addresses finished in {} ms",
            report.summary.total,
            report.summary.duration_ms
        );
        Ok(BatchOutcome { report, written })
    }
}
