//! Registry Client - HTTP implementation of the orb registry interface
//!
//! Talks JSON to `<host>/<endpoint>` with bearer-token auth. Transient
//! transport failures are retried here with exponential backoff; every
//! other failure is mapped to a `RegistryError` and surfaced unchanged.
//! Request timeouts come from `CliConfig` and are observed by callers as
//! ordinary network failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::config::CliConfig;
use crate::core::error::RegistryError;
use crate::core::retry::{RetryManager, RetryOptions};
use crate::core::traits::{
    OrbId, OrbRegistry, OrbWithData, OrbsForListing, ProcessedOrb,
};
use crate::validation::segment_validator::Segment;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest<'a> {
    version: &'a str,
    orb_yaml: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IncrementRequest<'a> {
    segment: Segment,
    orb_yaml: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromoteRequest<'a> {
    dev_version: &'a str,
    segment: Segment,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    namespace: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrbSourceRequest<'a> {
    orb_yaml: &'a str,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ValidationErrorBody {
    errors: Vec<ValidationMessage>,
}

#[derive(Deserialize)]
struct ValidationMessage {
    message: String,
}

/// HTTP client for the orb registry
pub struct RegistryClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<SecretString>,
    retry: RetryManager,
}

impl RegistryClient {
    pub fn new(config: &CliConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base(),
            token: config.token.clone(),
            retry: RetryManager::new(RetryOptions::default()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Attach the bearer token when one is configured.
    ///
    /// This is the only place the token value is exposed.
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Issue a request, rebuilding it for each retry attempt.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response, RegistryError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        self.retry
            .retry(|| {
                let request = self.authorized(build());
                async move { request.send().await }
            })
            .await
            .map_err(RegistryError::from)
    }

    /// Map a non-success response to an API error.
    async fn api_error(response: reqwest::Response) -> RegistryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        RegistryError::Api {
            message: Self::api_error_message(status, &body),
        }
    }

    /// Pull the registry's `message` out of an error body, falling back to
    /// the raw body and then the status line.
    fn api_error_message(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
            Err(_) => body.trim().to_string(),
        }
    }

    /// Parse a validation error body (`{"errors": [{"message": …}, …]}`).
    fn validation_messages(body: &str) -> Option<Vec<String>> {
        serde_json::from_str::<ValidationErrorBody>(body)
            .ok()
            .map(|parsed| parsed.errors.into_iter().map(|e| e.message).collect())
    }

    async fn expect_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RegistryError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn json_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::Decode {
                message: e.to_string(),
            })
    }

    /// Shared path for validate and process, which differ only in endpoint.
    async fn submit_orb(
        &self,
        endpoint: &str,
        orb_yaml: &str,
    ) -> Result<ProcessedOrb, RegistryError> {
        let url = self.url(endpoint);
        let response = self
            .send(|| self.http.post(&url).json(&OrbSourceRequest { orb_yaml }))
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            let messages = Self::validation_messages(&body).unwrap_or_else(|| {
                vec![Self::api_error_message(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &body,
                )]
            });
            return Err(RegistryError::Validation { messages });
        }

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }
}

#[async_trait]
impl OrbRegistry for RegistryClient {
    async fn resolve_id(&self, namespace: &str, name: &str) -> Result<OrbId, RegistryError> {
        let url = self.url(&format!("orb/{namespace}/{name}/id"));
        let response = self.send(|| self.http.get(&url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        let response = Self::expect_success(response).await?;
        let body: IdResponse = Self::json_body(response).await?;
        Ok(OrbId(body.id))
    }

    async fn publish_by_id(
        &self,
        orb_yaml: &str,
        id: &OrbId,
        version: &str,
    ) -> Result<OrbWithData, RegistryError> {
        let url = self.url(&format!("orb/{id}/publish"));
        let response = self
            .send(|| {
                self.http
                    .post(&url)
                    .json(&PublishRequest { version, orb_yaml })
            })
            .await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn increment_version(
        &self,
        orb_yaml: &str,
        namespace: &str,
        name: &str,
        segment: Segment,
    ) -> Result<OrbWithData, RegistryError> {
        let url = self.url(&format!("orb/{namespace}/{name}/increment"));
        let response = self
            .send(|| {
                self.http
                    .post(&url)
                    .json(&IncrementRequest { segment, orb_yaml })
            })
            .await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn promote(
        &self,
        namespace: &str,
        name: &str,
        dev_version: &str,
        segment: Segment,
    ) -> Result<OrbWithData, RegistryError> {
        let url = self.url(&format!("orb/{namespace}/{name}/promote"));
        let response = self
            .send(|| {
                self.http.post(&url).json(&PromoteRequest {
                    dev_version,
                    segment,
                })
            })
            .await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn create_orb(&self, namespace: &str, name: &str) -> Result<OrbId, RegistryError> {
        let url = self.url("orb");
        let response = self
            .send(|| self.http.post(&url).json(&CreateRequest { namespace, name }))
            .await?;

        let response = Self::expect_success(response).await?;
        let body: IdResponse = Self::json_body(response).await?;
        Ok(OrbId(body.id))
    }

    async fn list_all(&self, include_uncertified: bool) -> Result<OrbsForListing, RegistryError> {
        let url = self.url("orbs");
        let uncertified = include_uncertified.to_string();
        let response = self
            .send(|| self.http.get(&url).query(&[("uncertified", &uncertified)]))
            .await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn list_by_namespace(&self, namespace: &str) -> Result<OrbsForListing, RegistryError> {
        let url = self.url(&format!("orbs/{namespace}"));
        let response = self.send(|| self.http.get(&url)).await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn fetch_source(&self, reference: &str) -> Result<String, RegistryError> {
        let url = self.url("orb/source");
        let response = self
            .send(|| self.http.get(&url).query(&[("ref", reference)]))
            .await?;

        let response = Self::expect_success(response).await?;
        response.text().await.map_err(RegistryError::from)
    }

    async fn fetch_info(&self, reference: &str) -> Result<OrbWithData, RegistryError> {
        let url = self.url("orb/info");
        let response = self
            .send(|| self.http.get(&url).query(&[("ref", reference)]))
            .await?;

        let response = Self::expect_success(response).await?;
        Self::json_body(response).await
    }

    async fn validate_orb(&self, orb_yaml: &str) -> Result<ProcessedOrb, RegistryError> {
        self.submit_orb("orb/validate", orb_yaml).await
    }

    async fn process_orb(&self, orb_yaml: &str) -> Result<ProcessedOrb, RegistryError> {
        self.submit_orb("orb/process", orb_yaml).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RegistryClient {
        RegistryClient::new(&CliConfig::default()).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = client();
        assert_eq!(
            client.url("orb/foo/bar/id"),
            format!("{}/orb/foo/bar/id", CliConfig::default().api_base())
        );
    }

    #[test]
    fn test_api_error_message_prefers_the_message_field() {
        let message = RegistryClient::api_error_message(
            StatusCode::CONFLICT,
            r#"{"message": "version 1.0.0 already exists"}"#,
        );
        assert_eq!(message, "version 1.0.0 already exists");
    }

    #[test]
    fn test_api_error_message_falls_back_to_raw_body() {
        let message =
            RegistryClient::api_error_message(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(message, "upstream exploded");
    }

    #[test]
    fn test_api_error_message_falls_back_to_status() {
        let message = RegistryClient::api_error_message(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(message, "HTTP 500 Internal Server Error");
    }

    #[test]
    fn test_validation_messages_parse() {
        let body = r#"{"errors": [{"message": "bad key"}, {"message": "missing executor"}]}"#;
        let messages = RegistryClient::validation_messages(body).unwrap();
        assert_eq!(messages, vec!["bad key", "missing executor"]);
    }

    #[test]
    fn test_validation_messages_reject_other_shapes() {
        assert!(RegistryClient::validation_messages("not json").is_none());
        assert!(RegistryClient::validation_messages(r#"{"message": "x"}"#).is_none());
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let publish = serde_json::to_string(&PublishRequest {
            version: "1.0.0",
            orb_yaml: "version: 2.1",
        })
        .unwrap();
        assert!(publish.contains("\"orbYaml\""));

        let promote = serde_json::to_string(&PromoteRequest {
            dev_version: "dev:latest",
            segment: Segment::Major,
        })
        .unwrap();
        assert!(promote.contains("\"devVersion\":\"dev:latest\""));
        assert!(promote.contains("\"segment\":\"major\""));
    }
}
