//! Seed data, build identifiers, model specs and check descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{CheckOutputType, ModelConfig, ModelRegistration};

/// Project the flow registers everything under.
pub const PROJECT_NAME: &str = "Global";

pub const SCENARIO_SET_NAME: &str = "Questions for LLM text generation";

/// Passes the scenario input through unchanged.
pub const USER_PROMPT_TEMPLATE: &str = "{scenario_input}";

pub const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Platform-native fluency check run alongside the custom ones.
pub const NATIVE_FLUENCY_CHECK: &str = "fluency_summary";

pub const OPENAI_PROVIDER: &str = "openai";

/// One evaluation input.
///
/// `result` stays empty for reference-free checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDatum {
    pub input: String,
    #[serde(default)]
    pub result: String,
}

impl SeedDatum {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            result: String::new(),
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }
}

/// Per-invocation identifier embedded in names and tags, `{prefix}.{unix_millis}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId {
    pub fn new(prefix: &str) -> Self {
        Self::at(prefix, Utc::now())
    }

    pub fn at(prefix: &str, timestamp: DateTime<Utc>) -> Self {
        BuildId(format!("{}.{}", prefix, timestamp.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag attached to every registration and run of this build.
    pub fn tag(&self) -> String {
        format!("Build:{}", self.0)
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A model under test: display name plus upstream model id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub model_id: String,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_id: model_id.into(),
        }
    }

    pub fn base() -> Self {
        Self::new("Base Text Generator", "gpt-3.5-turbo-0125")
    }

    pub fn fine_tuned() -> Self {
        Self::new(
            "Fine-Tuned Text Generator",
            "ft:gpt-3.5-turbo-0125:wizard-on-demand::AXSgdIHf",
        )
    }

    /// Build the upsert registration for this model.
    pub fn registration(
        &self,
        build: &BuildId,
        project_id: &str,
        temperature: f64,
        user_prompt_template: &str,
    ) -> ModelRegistration {
        ModelRegistration {
            name: self.name.clone(),
            tags: vec![build.tag()],
            project_id: project_id.to_string(),
            models: ModelConfig {
                provider: OPENAI_PROVIDER.to_string(),
                model_id: self.model_id.clone(),
                temperature,
                user_prompt_template: user_prompt_template.to_string(),
            },
            update: true,
        }
    }

    pub fn run_name(&self, build: &BuildId) -> String {
        format!("{} Eval {}", self.name, build)
    }
}

/// A custom check to register before the runs.
///
/// Without a `prompt` the platform is asked to generate grading code from
/// the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub output_data_type: CheckOutputType,
    #[serde(default)]
    pub requires_scenario_input: Option<bool>,
    #[serde(default)]
    pub requires_scenario_result: Option<bool>,
}

impl CheckDescriptor {
    /// LLM-as-judge check scored from a prompt template.
    pub fn prompted(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: Some(prompt.into()),
            output_data_type: CheckOutputType::Score,
            requires_scenario_input: None,
            requires_scenario_result: None,
        }
    }

    /// Check whose grading code is generated platform-side.
    pub fn generated(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: None,
            output_data_type: CheckOutputType::Score,
            requires_scenario_input: None,
            requires_scenario_result: None,
        }
    }
}
