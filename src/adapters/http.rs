use crate::domain::model::{CorrectedFields, RegistryLookupResult, Suggestion};
use crate::domain::ports::{RegistryLookup, SuggestionLookup};
use crate::utils::error::{Result, ValidatorError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Body of `GET /validate`.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    street_name: Option<String>,
    #[serde(default)]
    house_number: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    zip: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestResponse {
    Wrapped { suggestions: Vec<Suggestion> },
    Bare(Vec<Suggestion>),
}

/// Client for a JSON address registry service.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl RegistryClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let mut request = self.client.get(format!("{}/{}", self.endpoint, path));

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request
    }

    async fn error_from(response: reqwest::Response) -> ValidatorError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        ValidatorError::RegistryError { status, message }
    }
}

impl LookupResponse {
    fn into_result(self) -> Result<RegistryLookupResult> {
        match self.status.to_ascii_uppercase().as_str() {
            "EXACT" => Ok(RegistryLookupResult::ExactMatch),
            "NOT_FOUND" | "NONE" => Ok(RegistryLookupResult::NoMatch),
            "PARTIAL" => {
                let confidence =
                    self.confidence
                        .ok_or_else(|| ValidatorError::ProcessingError {
                            message: "Partial match without confidence".to_string(),
                        })?;
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(ValidatorError::ProcessingError {
                        message: format!("Confidence {} outside [0, 1]", confidence),
                    });
                }
                Ok(RegistryLookupResult::PartialMatch {
                    confidence,
                    corrected: CorrectedFields {
                        street_name: self.street_name,
                        house_number: self.house_number,
                        municipality: self.municipality,
                        zip: self.zip,
                    },
                })
            }
            other => Err(ValidatorError::ProcessingError {
                message: format!("Unknown registry match status: {}", other),
            }),
        }
    }
}

#[async_trait]
impl RegistryLookup for RegistryClient {
    async fn lookup(
        &self,
        street: &str,
        house_number: &str,
        city: &str,
        zip: &str,
    ) -> Result<RegistryLookupResult> {
        let response = self
            .request("validate")
            .query(&[
                ("street", street),
                ("house_number", house_number),
                ("city", city),
                ("zip", zip),
            ])
            .send()
            .await?;

        tracing::debug!("Registry lookup status: {}", response.status());

        match response.status() {
            StatusCode::NOT_FOUND => Ok(RegistryLookupResult::NoMatch),
            status if status.is_success() => {
                let body: LookupResponse = response.json().await?;
                body.into_result()
            }
            _ => Err(Self::error_from(response).await),
        }
    }
}

#[async_trait]
impl SuggestionLookup for RegistryClient {
    async fn suggest(&self, street: &str, city: &str) -> Result<Vec<Suggestion>> {
        let response = self
            .request("suggest")
            .query(&[("street", street), ("city", city)])
            .send()
            .await?;

        tracing::debug!("Registry suggest status: {}", response.status());

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let suggestions = match response.json::<SuggestResponse>().await? {
            SuggestResponse::Wrapped { suggestions } => suggestions,
            SuggestResponse::Bare(suggestions) => suggestions,
        };
        tracing::debug!("Registry returned {} suggestions", suggestions.len());
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_exact_match() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/validate")
                .query_param("street", "Namesti Svobody")
                .query_param("house_number", "12")
                .query_param("city", "Brno")
                .query_param("zip", "60200");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "EXACT"}));
        });

        let client = RegistryClient::new(server.base_url());
        let result = client
            .lookup("Namesti Svobody", "12", "Brno", "60200")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(result, RegistryLookupResult::ExactMatch);
    }

    #[tokio::test]
    async fn test_partial_match_maps_corrected_fields() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/validate");
            then.status(200).json_body(serde_json::json!({
                "status": "PARTIAL",
                "confidence": 0.9,
                "street_name": "Hlavní",
                "house_number": null,
                "municipality": "Brno"
            }));
        });

        let client = RegistryClient::new(server.base_url());
        let result = client.lookup("Hlavni", "12", "Brno", "").await.unwrap();

        api_mock.assert();
        assert_eq!(
            result,
            RegistryLookupResult::PartialMatch {
                confidence: 0.9,
                corrected: CorrectedFields {
                    street_name: Some("Hlavní".to_string()),
                    house_number: None,
                    municipality: Some("Brno".to_string()),
                    zip: None,
                },
            }
        );
    }

    #[tokio::test]
    async fn test_not_found_status_is_no_match() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/validate");
            then.status(404);
        });

        let client = RegistryClient::new(server.base_url());
        let result = client.lookup("Main St", "1", "Nowhere", "00000").await.unwrap();

        api_mock.assert();
        assert_eq!(result, RegistryLookupResult::NoMatch);
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/validate");
            then.status(500).body("boom");
        });

        let client = RegistryClient::new(server.base_url());
        let err = client.lookup("Main St", "1", "Brno", "").await.unwrap_err();

        api_mock.assert();
        match err {
            ValidatorError::RegistryError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/validate");
            then.status(200)
                .json_body(serde_json::json!({"status": "PARTIAL", "confidence": 1.7}));
        });

        let client = RegistryClient::new(server.base_url());
        let err = client.lookup("Main St", "1", "Brno", "").await.unwrap_err();

        assert!(matches!(err, ValidatorError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_headers_are_sent() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/validate")
                .header("X-Api-Key", "secret");
            then.status(200).json_body(serde_json::json!({"status": "EXACT"}));
        });

        let mut headers = HashMap::new();
        headers.insert("X-Api-Key".to_string(), "secret".to_string());
        let client = RegistryClient::new(format!("{}/", server.base_url())).with_headers(headers);

        client.lookup("Main St", "1", "Brno", "").await.unwrap();
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_suggest_preserves_order() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/suggest")
                .query_param("street", "Hlav")
                .query_param("city", "Brno");
            then.status(200).json_body(serde_json::json!({
                "suggestions": [
                    {"street": "Hlavní", "city": "Brno", "zip": "60200"},
                    {"street": "Hlavákova", "city": "Brno"}
                ]
            }));
        });

        let client = RegistryClient::new(server.base_url());
        let suggestions = client.suggest("Hlav", "Brno").await.unwrap();

        api_mock.assert();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].street, "Hlavní");
        assert_eq!(suggestions[0].zip.as_deref(), Some("60200"));
        assert_eq!(suggestions[1].street, "Hlavákova");
        assert_eq!(suggestions[1].zip, None);
    }

    #[tokio::test]
    async fn test_suggest_accepts_bare_array() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/suggest");
            then.status(200)
                .json_body(serde_json::json!([{"street": "Nádražní", "city": "Brno"}]));
        });

        let client = RegistryClient::new(server.base_url());
        let suggestions = client.suggest("Nadrazni", "Brno").await.unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].street, "Nádražní");
    }
}
