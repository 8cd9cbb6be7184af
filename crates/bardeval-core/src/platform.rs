//! Evaluation platform contract
//!
//! `EvalPlatform` is the seam between the flow and the hosted evaluation
//! service. Every call maps to one remote endpoint and returns an explicit
//! result struct. An in-memory implementation lives in [`crate::fakes`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::SeedDatum;
use crate::error::PlatformError;

/// Result type for platform calls
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

// ---------------------------------------------------------------------------
// Projects & scenario sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Request body for creating a scenario set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScenarioSet {
    pub name: String,
    pub project_id: String,
    pub seed_data: Vec<SeedDatum>,
}

/// A scenario set as stored by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenario_id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub seed_data: Vec<SeedDatum>,
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Upstream model configuration attached to a registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider type, e.g. `openai`
    #[serde(rename = "type")]
    pub provider: String,
    pub model_id: String,
    pub temperature: f64,
    pub user_prompt_template: String,
}

/// Request body for registering (or updating) a model under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistration {
    pub name: String,
    pub tags: Vec<String>,
    pub project_id: String,
    pub models: ModelConfig,
    /// Overwrite an existing registration with the same name
    pub update: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Output type of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutputType {
    Score,
    PassFail,
}

/// Brief listing entry for an existing check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body asking the platform to write grading code for a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckGenerateRequest {
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub output_data_type: CheckOutputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_scenario_input: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_scenario_result: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCheck {
    pub name: String,
    #[serde(default)]
    pub generated_code: String,
}

/// How a check scores an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckConfig {
    /// LLM-as-judge prompt with an `{output}` placeholder
    Prompt {
        prompt_template: String,
        #[serde(rename = "type")]
        output_type: CheckOutputType,
    },
    /// Platform-generated grading code
    Code {
        code_contents: String,
        #[serde(rename = "type")]
        output_type: CheckOutputType,
    },
}

/// Request body for creating or updating a check by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckUpsert {
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub check_config: CheckConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Evaluation runs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestRunType {
    #[serde(rename = "NL_GENERATION")]
    NlGeneration,
}

/// Request body for running a registered model against a scenario set.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Registered model id
    pub mut_id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub project_id: String,
    pub scenario_id: String,
    pub calculate_metrics: bool,
    #[serde(rename = "type")]
    pub run_type: TestRunType,
    pub checks: Vec<String>,
    /// Provider name to API key, forwarded to the model provider
    pub api_keys: BTreeMap<String, String>,
}

impl std::fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunRequest")
            .field("mut_id", &self.mut_id)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("project_id", &self.project_id)
            .field("scenario_id", &self.scenario_id)
            .field("calculate_metrics", &self.calculate_metrics)
            .field("run_type", &self.run_type)
            .field("checks", &self.checks)
            .field("api_keys", &self.api_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Aggregate metrics computed platform-side for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub mean_scores: BTreeMap<String, f64>,
}

/// Result record of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub id: String,
    pub name: String,
    pub scenario_set_id: String,
    #[serde(rename = "mut_id", default)]
    pub model_id: Option<String>,
    /// Link to the hosted report
    pub app_link: String,
    #[serde(default)]
    pub model_metrics: Option<ModelMetrics>,
}

// ---------------------------------------------------------------------------
// EvalPlatform
// ---------------------------------------------------------------------------

/// Hosted evaluation platform.
///
/// Upsert-style calls (`register_model` with `update`, `upsert_check`) are
/// idempotent by name. Nothing else is guaranteed beyond what the remote
/// service provides.
#[async_trait]
pub trait EvalPlatform: Send + Sync {
    async fn list_projects(&self) -> PlatformResult<Vec<Project>>;

    async fn create_scenario_set(&self, request: &NewScenarioSet) -> PlatformResult<ScenarioSet>;

    async fn register_model(
        &self,
        registration: &ModelRegistration,
    ) -> PlatformResult<RegisteredModel>;

    async fn list_checks(&self) -> PlatformResult<Vec<CheckSummary>>;

    /// Ask the platform to write grading code from a check description.
    async fn generate_check(&self, request: &CheckGenerateRequest)
        -> PlatformResult<GeneratedCheck>;

    async fn upsert_check(&self, upsert: &CheckUpsert) -> PlatformResult<CheckRecord>;

    /// Execute a model against a scenario set and wait for the result.
    async fn run_evaluation(&self, request: &RunRequest) -> PlatformResult<RunResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_config_serializes_type_field() {
        let config = CheckConfig::Prompt {
            prompt_template: "Rate {output}".to_string(),
            output_type: CheckOutputType::Score,
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({ "prompt_template": "Rate {output}", "type": "score" })
        );
    }

    #[test]
    fn code_config_deserializes_untagged() {
        let config: CheckConfig = serde_json::from_value(json!({
            "code_contents": "def evaluate(): ...",
            "type": "pass_fail"
        }))
        .unwrap();
        assert!(matches!(
            config,
            CheckConfig::Code {
                output_type: CheckOutputType::PassFail,
                ..
            }
        ));
    }

    #[test]
    fn run_result_reads_mut_id_and_metrics() {
        let run: RunResult = serde_json::from_value(json!({
            "id": "run-1",
            "name": "Base Text Generator Eval local.1",
            "scenario_set_id": "sc-1",
            "mut_id": "m-1",
            "app_link": "https://app.okareo.com/project/p/eval/run-1",
            "model_metrics": { "mean_scores": { "fluency_summary": 4.2 } },
            "test_data_point_count": 10
        }))
        .unwrap();
        assert_eq!(run.model_id.as_deref(), Some("m-1"));
        assert_eq!(
            run.model_metrics.unwrap().mean_scores["fluency_summary"],
            4.2
        );
    }

    #[test]
    fn run_request_debug_hides_api_keys() {
        let mut api_keys = BTreeMap::new();
        api_keys.insert("openai".to_string(), "sk-secret".to_string());
        let request = RunRequest {
            mut_id: "m".to_string(),
            name: "n".to_string(),
            tags: vec![],
            project_id: "p".to_string(),
            scenario_id: "s".to_string(),
            calculate_metrics: true,
            run_type: TestRunType::NlGeneration,
            checks: vec![],
            api_keys,
        };
        let rendered = format!("{:?}", request);
        assert!(rendered.contains("openai"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn run_type_serializes_screaming() {
        assert_eq!(
            serde_json::to_value(TestRunType::NlGeneration).unwrap(),
            json!("NL_GENERATION")
        );
    }
}
