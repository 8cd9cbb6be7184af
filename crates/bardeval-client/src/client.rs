//! REST implementation of [`EvalPlatform`].
//!
//! Every call is one JSON request authenticated with the `api-key` header.
//! Non-success statuses surface as `PlatformError::Status` with a truncated
//! body; nothing is retried here.

use async_trait::async_trait;
use bardeval_core::platform::{
    CheckGenerateRequest, CheckRecord, CheckSummary, CheckUpsert, EvalPlatform, GeneratedCheck,
    ModelRegistration, NewScenarioSet, PlatformResult, Project, RegisteredModel, RunRequest,
    RunResult, ScenarioSet,
};
use bardeval_core::PlatformError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClientConfig;

const API_KEY_HEADER: &str = "api-key";
const MAX_ERROR_BODY_CHARS: usize = 500;

const PROJECTS_PATH: &str = "/v0/projects";
const SCENARIO_SETS_PATH: &str = "/v0/scenario_sets";
const REGISTER_MODEL_PATH: &str = "/v0/register_model";
const CHECKS_PATH: &str = "/v0/checks";
const CHECK_GENERATE_PATH: &str = "/v0/check_generate";
const CHECK_UPSERT_PATH: &str = "/v0/check_create_or_update";
const TEST_RUN_PATH: &str = "/v0/test_run";

/// Client for the hosted evaluation platform
pub struct OkareoClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl OkareoClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: ClientConfig) -> PlatformResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PlatformError::Config(
                "platform API key is empty (set OKAREO_API_KEY)".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("bardeval/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(OkareoClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> PlatformResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PlatformResult<T> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> PlatformResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }
}

fn transport_error(err: reqwest::Error) -> PlatformError {
    PlatformError::Http(err.to_string())
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> PlatformResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(PlatformError::Status {
            status: status.as_u16(),
            body: truncate(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        PlatformError::Decode(format!("{} (body: {})", e, truncate(&body)))
    })
}

#[async_trait]
impl EvalPlatform for OkareoClient {
    async fn list_projects(&self) -> PlatformResult<Vec<Project>> {
        self.get_json(PROJECTS_PATH).await
    }

    async fn create_scenario_set(&self, request: &NewScenarioSet) -> PlatformResult<ScenarioSet> {
        info!(
            "Creating scenario set '{}' ({} seeds)",
            request.name,
            request.seed_data.len()
        );
        self.post_json(SCENARIO_SETS_PATH, request).await
    }

    async fn register_model(
        &self,
        registration: &ModelRegistration,
    ) -> PlatformResult<RegisteredModel> {
        info!(
            "Registering model '{}' ({})",
            registration.name, registration.models.model_id
        );
        self.post_json(REGISTER_MODEL_PATH, registration).await
    }

    async fn list_checks(&self) -> PlatformResult<Vec<CheckSummary>> {
        self.get_json(CHECKS_PATH).await
    }

    async fn generate_check(
        &self,
        request: &CheckGenerateRequest,
    ) -> PlatformResult<GeneratedCheck> {
        info!("Generating grading code for check '{}'", request.name);
        self.post_json(CHECK_GENERATE_PATH, request).await
    }

    async fn upsert_check(&self, upsert: &CheckUpsert) -> PlatformResult<CheckRecord> {
        self.post_json(CHECK_UPSERT_PATH, upsert).await
    }

    async fn run_evaluation(&self, request: &RunRequest) -> PlatformResult<RunResult> {
        info!(
            "Running '{}' with {} check(s)",
            request.name,
            request.checks.len()
        );
        self.post_json(TEST_RUN_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OkareoClient::new(ClientConfig::new("http://localhost:1", "key"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = OkareoClient::new(ClientConfig::new("http://localhost:1", " "))
            .err()
            .expect("empty key must fail");
        assert!(matches!(err, PlatformError::Config(_)));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS + 10);
        assert_eq!(truncate(&body).chars().count(), MAX_ERROR_BODY_CHARS);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = OkareoClient::new(ClientConfig::new("http://127.0.0.1:1", "key")).unwrap();
        let err = client.list_projects().await.unwrap_err();
        assert!(matches!(err, PlatformError::Http(_)));
    }
}
