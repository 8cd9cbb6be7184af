//! Base vs fine-tuned evaluation flow.
//!
//! One call to [`EvalFlow::run`] resolves the project, creates the scenario
//! set, registers both models and the custom checks, runs both evaluations
//! and summarises them. Nothing is retried or checkpointed: the first
//! pipeline error aborts the whole flow.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::checks::{CheckRegistrar, RegistrationReport};
use crate::domain::{
    BuildId, CheckDescriptor, ModelSpec, SeedDatum, DEFAULT_TEMPERATURE, NATIVE_FLUENCY_CHECK,
    OPENAI_PROVIDER, PROJECT_NAME, SCENARIO_SET_NAME, USER_PROMPT_TEMPLATE,
};
use crate::error::{FlowError, Result};
use crate::platform::{
    EvalPlatform, NewScenarioSet, Project, RegisteredModel, RunRequest, RunResult, ScenarioSet,
    TestRunType,
};
use crate::report::{ReportSummary, ThresholdPolicy};

/// Everything one flow invocation needs.
#[derive(Clone)]
pub struct FlowConfig {
    pub project_name: String,
    pub build_id: BuildId,
    pub seed_data: Vec<SeedDatum>,
    pub base_model: ModelSpec,
    pub fine_tuned_model: ModelSpec,
    pub temperature: f64,
    pub user_prompt_template: String,
    /// Built-in platform checks selected for the runs
    pub native_checks: Vec<String>,
    /// Checks registered before the runs
    pub custom_checks: Vec<CheckDescriptor>,
    pub thresholds: ThresholdPolicy,
    /// Model provider key forwarded with each run
    pub model_api_key: String,
    /// Await both runs together instead of one after the other
    pub parallel_runs: bool,
    /// Abort when any custom check fails to register
    pub strict_checks: bool,
}

impl FlowConfig {
    /// Config with the stock models, template and thresholds.
    pub fn new(
        build_id: BuildId,
        seed_data: Vec<SeedDatum>,
        custom_checks: Vec<CheckDescriptor>,
        model_api_key: impl Into<String>,
    ) -> Self {
        Self {
            project_name: PROJECT_NAME.to_string(),
            build_id,
            seed_data,
            base_model: ModelSpec::base(),
            fine_tuned_model: ModelSpec::fine_tuned(),
            temperature: DEFAULT_TEMPERATURE,
            user_prompt_template: USER_PROMPT_TEMPLATE.to_string(),
            native_checks: vec![NATIVE_FLUENCY_CHECK.to_string()],
            custom_checks,
            thresholds: ThresholdPolicy::default(),
            model_api_key: model_api_key.into(),
            parallel_runs: false,
            strict_checks: false,
        }
    }

    pub fn scenario_set_name(&self) -> String {
        format!("{} Scenario Set - {}", SCENARIO_SET_NAME, self.build_id)
    }

    /// Native checks followed by the custom check names.
    pub fn check_names(&self) -> Vec<String> {
        self.native_checks
            .iter()
            .cloned()
            .chain(self.custom_checks.iter().map(|c| c.name.clone()))
            .collect()
    }
}

impl std::fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowConfig")
            .field("project_name", &self.project_name)
            .field("build_id", &self.build_id)
            .field("seed_data", &self.seed_data)
            .field("base_model", &self.base_model)
            .field("fine_tuned_model", &self.fine_tuned_model)
            .field("temperature", &self.temperature)
            .field("user_prompt_template", &self.user_prompt_template)
            .field("native_checks", &self.native_checks)
            .field("custom_checks", &self.custom_checks)
            .field("thresholds", &self.thresholds)
            .field("model_api_key", &"<redacted>")
            .field("parallel_runs", &self.parallel_runs)
            .field("strict_checks", &self.strict_checks)
            .finish()
    }
}

/// One model's registration, run and threshold summary.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEvaluation {
    pub label: String,
    pub model: RegisteredModel,
    pub run: RunResult,
    pub summary: ReportSummary,
}

/// Everything the flow produced.
#[derive(Debug, Clone, Serialize)]
pub struct FlowOutcome {
    pub build_id: String,
    pub project: Project,
    pub scenario: ScenarioSet,
    pub registration: RegistrationReport,
    pub base: ModelEvaluation,
    pub fine_tuned: ModelEvaluation,
}

/// Drives the flow against a platform.
pub struct EvalFlow<'a> {
    platform: &'a dyn EvalPlatform,
}

impl<'a> EvalFlow<'a> {
    pub fn new(platform: &'a dyn EvalPlatform) -> Self {
        Self { platform }
    }

    pub async fn run(&self, config: &FlowConfig) -> Result<FlowOutcome> {
        let span = info_span!("eval_flow", build = %config.build_id);
        self.run_inner(config).instrument(span).await
    }

    async fn run_inner(&self, config: &FlowConfig) -> Result<FlowOutcome> {
        let project = self.resolve_project(&config.project_name).await?;
        info!("Using project {} ({})", project.name, project.id);

        let scenario = self
            .platform
            .create_scenario_set(&NewScenarioSet {
                name: config.scenario_set_name(),
                project_id: project.id.clone(),
                seed_data: config.seed_data.clone(),
            })
            .await?;
        info!(
            "Created scenario set {} with {} seed(s)",
            scenario.scenario_id,
            config.seed_data.len()
        );

        let base_model = self
            .register_model(&config.base_model, config, &project.id)
            .await?;
        let ft_model = self
            .register_model(&config.fine_tuned_model, config, &project.id)
            .await?;

        let registration = CheckRegistrar::new(self.platform, &project.id)
            .register_all(&config.custom_checks)
            .await;
        if !registration.is_complete() {
            if config.strict_checks {
                return Err(FlowError::ChecksFailed {
                    failed: registration.failed_names(),
                });
            }
            warn!(
                "Continuing with {} of {} custom check(s) registered",
                registration.registered.len(),
                config.custom_checks.len()
            );
        }

        let checks = config.check_names();
        let base_request = self.run_request(
            &base_model,
            &config.base_model,
            &scenario,
            &checks,
            config,
            &project.id,
        );
        let ft_request = self.run_request(
            &ft_model,
            &config.fine_tuned_model,
            &scenario,
            &checks,
            config,
            &project.id,
        );

        let (base_run, ft_run) = if config.parallel_runs {
            futures::future::try_join(
                self.platform.run_evaluation(&base_request),
                self.platform.run_evaluation(&ft_request),
            )
            .await?
        } else {
            let base_run = self.platform.run_evaluation(&base_request).await?;
            let ft_run = self.platform.run_evaluation(&ft_request).await?;
            (base_run, ft_run)
        };
        info!("Base run {} complete", base_run.id);
        info!("Fine-tuned run {} complete", ft_run.id);

        let base = ModelEvaluation {
            label: "base".to_string(),
            summary: config.thresholds.evaluate(&base_run),
            model: base_model,
            run: base_run,
        };
        let fine_tuned = ModelEvaluation {
            label: "fine-tuned".to_string(),
            summary: config.thresholds.evaluate(&ft_run),
            model: ft_model,
            run: ft_run,
        };

        Ok(FlowOutcome {
            build_id: config.build_id.to_string(),
            project,
            scenario,
            registration,
            base,
            fine_tuned,
        })
    }

    async fn resolve_project(&self, name: &str) -> Result<Project> {
        self.platform
            .list_projects()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| FlowError::ProjectNotFound(name.to_string()))
    }

    async fn register_model(
        &self,
        spec: &ModelSpec,
        config: &FlowConfig,
        project_id: &str,
    ) -> Result<RegisteredModel> {
        let registration = spec.registration(
            &config.build_id,
            project_id,
            config.temperature,
            &config.user_prompt_template,
        );
        let model = self.platform.register_model(&registration).await?;
        info!("Registered model {} as {}", spec.name, model.id);
        Ok(model)
    }

    fn run_request(
        &self,
        model: &RegisteredModel,
        spec: &ModelSpec,
        scenario: &ScenarioSet,
        checks: &[String],
        config: &FlowConfig,
        project_id: &str,
    ) -> RunRequest {
        let mut api_keys = BTreeMap::new();
        api_keys.insert(OPENAI_PROVIDER.to_string(), config.model_api_key.clone());
        RunRequest {
            mut_id: model.id.clone(),
            name: spec.run_name(&config.build_id),
            tags: vec![config.build_id.tag()],
            project_id: project_id.to_string(),
            scenario_id: scenario.scenario_id.clone(),
            calculate_metrics: true,
            run_type: TestRunType::NlGeneration,
            checks: checks.to_vec(),
            api_keys,
        }
    }
}
