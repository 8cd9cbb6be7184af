//! bardeval core library
//!
//! Evaluates a base OpenAI model against its fine-tuned variant on a hosted
//! LLM-evaluation platform.
//!
//! ## Key Components
//!
//! - `EvalPlatform`: async contract for the remote platform
//! - `CheckRegistrar`: best-effort upsert of custom judge checks
//! - `EvalFlow`: the linear register-and-run flow
//! - `ThresholdPolicy`: informational post-run metric minimums
//! - `Preset`: the bundled local and CI flow configurations

pub mod checks;
pub mod domain;
mod error;
pub mod fakes;
pub mod flow;
pub mod platform;
pub mod preset;
pub mod report;
pub mod telemetry;

pub use checks::{CheckFailure, CheckRegistrar, RegistrationReport};
pub use domain::{
    BuildId, CheckDescriptor, ModelSpec, SeedDatum, DEFAULT_TEMPERATURE, NATIVE_FLUENCY_CHECK,
    PROJECT_NAME, SCENARIO_SET_NAME, USER_PROMPT_TEMPLATE,
};
pub use error::{FlowError, PlatformError, Result};
pub use flow::{EvalFlow, FlowConfig, FlowOutcome, ModelEvaluation};
pub use platform::{
    CheckConfig, CheckGenerateRequest, CheckOutputType, CheckRecord, CheckSummary, CheckUpsert,
    EvalPlatform, GeneratedCheck, ModelConfig, ModelMetrics, ModelRegistration, NewScenarioSet,
    PlatformResult, Project, RegisteredModel, RunRequest, RunResult, ScenarioSet, TestRunType,
};
pub use preset::{load_prompt, load_seed_file, FailureMode, Preset};
pub use report::{MetricOutcome, ReportSummary, ThresholdPolicy};
pub use telemetry::init_tracing;

/// bardeval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
