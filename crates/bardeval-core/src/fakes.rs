//! In-memory fake of the evaluation platform (testing only)
//!
//! `MemoryPlatform` satisfies the [`EvalPlatform`] contract without any
//! network access. It records every call in order and supports failure
//! injection for individual checks.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::PROJECT_NAME;
use crate::error::PlatformError;
use crate::platform::*;

/// One recorded platform call, with the name it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    ListProjects,
    CreateScenarioSet(String),
    RegisterModel(String),
    ListChecks,
    GenerateCheck(String),
    UpsertCheck(String),
    RunEvaluation(String),
}

/// A check as stored by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCheck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub config: CheckConfig,
}

/// A run as seen by the fake: the request minus its keys, plus the result.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRun {
    pub name: String,
    pub model_id: String,
    pub scenario_id: String,
    pub checks: Vec<String>,
    pub tags: Vec<String>,
    pub calculate_metrics: bool,
    pub providers: Vec<String>,
    pub result: RunResult,
}

#[derive(Debug, Default)]
struct PlatformState {
    projects: Vec<Project>,
    scenario_sets: Vec<ScenarioSet>,
    models: BTreeMap<String, RegisteredModel>,
    checks: BTreeMap<String, StoredCheck>,
    runs: Vec<RecordedRun>,
    calls: Vec<PlatformCall>,
    failing_checks: HashSet<String>,
    generated_code: String,
    mean_scores: BTreeMap<String, f64>,
    fail_runs: bool,
}

/// In-memory evaluation platform.
#[derive(Debug)]
pub struct MemoryPlatform {
    state: Mutex<PlatformState>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// Platform with a single `Global` project.
    pub fn new() -> Self {
        Self::with_projects(&[PROJECT_NAME])
    }

    pub fn with_projects(names: &[&str]) -> Self {
        let projects = names
            .iter()
            .map(|name| Project {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
            })
            .collect();
        MemoryPlatform {
            state: Mutex::new(PlatformState {
                projects,
                generated_code: "def evaluate(model_output: str) -> int:\n    return 3\n"
                    .to_string(),
                ..PlatformState::default()
            }),
        }
    }

    /// Make `upsert_check` fail for this check name.
    pub fn fail_check(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_checks
            .insert(name.to_string());
        self
    }

    /// Code returned by `generate_check`; empty simulates a generation miss.
    pub fn with_generated_code(self, code: &str) -> Self {
        self.state.lock().unwrap().generated_code = code.to_string();
        self
    }

    /// Mean scores attached to every run result.
    pub fn with_mean_scores(self, scores: &[(&str, f64)]) -> Self {
        self.state.lock().unwrap().mean_scores = scores
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        self
    }

    /// Make every `run_evaluation` call fail.
    pub fn fail_runs(self) -> Self {
        self.state.lock().unwrap().fail_runs = true;
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn scenario_sets(&self) -> Vec<ScenarioSet> {
        self.state.lock().unwrap().scenario_sets.clone()
    }

    pub fn models(&self) -> Vec<RegisteredModel> {
        self.state.lock().unwrap().models.values().cloned().collect()
    }

    pub fn checks(&self) -> Vec<StoredCheck> {
        self.state.lock().unwrap().checks.values().cloned().collect()
    }

    pub fn check(&self, name: &str) -> Option<StoredCheck> {
        self.state.lock().unwrap().checks.get(name).cloned()
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.state.lock().unwrap().runs.clone()
    }

    pub fn project_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
    }
}

#[async_trait]
impl EvalPlatform for MemoryPlatform {
    async fn list_projects(&self) -> PlatformResult<Vec<Project>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::ListProjects);
        Ok(state.projects.clone())
    }

    async fn create_scenario_set(&self, request: &NewScenarioSet) -> PlatformResult<ScenarioSet> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PlatformCall::CreateScenarioSet(request.name.clone()));
        if !state.projects.iter().any(|p| p.id == request.project_id) {
            return Err(PlatformError::NotFound {
                entity: "project",
                name: request.project_id.clone(),
            });
        }
        let scenario = ScenarioSet {
            scenario_id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            project_id: Some(request.project_id.clone()),
            seed_data: request.seed_data.clone(),
        };
        state.scenario_sets.push(scenario.clone());
        Ok(scenario)
    }

    async fn register_model(
        &self,
        registration: &ModelRegistration,
    ) -> PlatformResult<RegisteredModel> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PlatformCall::RegisterModel(registration.name.clone()));

        if let Some(existing) = state.models.get_mut(&registration.name) {
            if !registration.update {
                return Err(PlatformError::Rejected(format!(
                    "model {} already registered",
                    registration.name
                )));
            }
            existing.tags = registration.tags.clone();
            return Ok(existing.clone());
        }

        let model = RegisteredModel {
            id: uuid::Uuid::new_v4().to_string(),
            name: registration.name.clone(),
            tags: registration.tags.clone(),
        };
        state
            .models
            .insert(registration.name.clone(), model.clone());
        Ok(model)
    }

    async fn list_checks(&self) -> PlatformResult<Vec<CheckSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::ListChecks);
        Ok(state
            .checks
            .values()
            .map(|c| CheckSummary {
                id: Some(c.id.clone()),
                name: c.name.clone(),
                description: Some(c.description.clone()),
            })
            .collect())
    }

    async fn generate_check(
        &self,
        request: &CheckGenerateRequest,
    ) -> PlatformResult<GeneratedCheck> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PlatformCall::GenerateCheck(request.name.clone()));
        Ok(GeneratedCheck {
            name: request.name.clone(),
            generated_code: state.generated_code.clone(),
        })
    }

    async fn upsert_check(&self, upsert: &CheckUpsert) -> PlatformResult<CheckRecord> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PlatformCall::UpsertCheck(upsert.name.clone()));
        if state.failing_checks.contains(&upsert.name) {
            return Err(PlatformError::Status {
                status: 422,
                body: format!("check {} rejected", upsert.name),
            });
        }

        let id = state
            .checks
            .get(&upsert.name)
            .map(|c| c.id.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        state.checks.insert(
            upsert.name.clone(),
            StoredCheck {
                id: id.clone(),
                name: upsert.name.clone(),
                description: upsert.description.clone(),
                config: upsert.check_config.clone(),
            },
        );
        Ok(CheckRecord {
            id,
            name: upsert.name.clone(),
        })
    }

    async fn run_evaluation(&self, request: &RunRequest) -> PlatformResult<RunResult> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PlatformCall::RunEvaluation(request.name.clone()));

        if state.fail_runs {
            return Err(PlatformError::Http("connection reset".to_string()));
        }
        if !state
            .scenario_sets
            .iter()
            .any(|s| s.scenario_id == request.scenario_id)
        {
            return Err(PlatformError::NotFound {
                entity: "scenario set",
                name: request.scenario_id.clone(),
            });
        }
        if !state.models.values().any(|m| m.id == request.mut_id) {
            return Err(PlatformError::NotFound {
                entity: "model",
                name: request.mut_id.clone(),
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        let result = RunResult {
            id: id.clone(),
            name: request.name.clone(),
            scenario_set_id: request.scenario_id.clone(),
            model_id: Some(request.mut_id.clone()),
            app_link: format!(
                "https://app.okareo.com/project/{}/eval/{}",
                request.project_id, id
            ),
            model_metrics: request.calculate_metrics.then(|| ModelMetrics {
                mean_scores: state.mean_scores.clone(),
            }),
        };
        state.runs.push(RecordedRun {
            name: request.name.clone(),
            model_id: request.mut_id.clone(),
            scenario_id: request.scenario_id.clone(),
            checks: request.checks.clone(),
            tags: request.tags.clone(),
            calculate_metrics: request.calculate_metrics,
            providers: request.api_keys.keys().cloned().collect(),
            result: result.clone(),
        });
        Ok(result)
    }
}
