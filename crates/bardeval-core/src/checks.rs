//! Best-effort check registration.
//!
//! Each descriptor is upserted on its own; a failure is logged and recorded
//! in the [`RegistrationReport`] and the loop moves on to the next check.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::CheckDescriptor;
use crate::error::{FlowError, Result};
use crate::platform::{CheckConfig, CheckGenerateRequest, CheckRecord, CheckUpsert, EvalPlatform};

/// A check that could not be registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of registering a batch of checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationReport {
    pub registered: Vec<CheckRecord>,
    pub failed: Vec<CheckFailure>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.name.clone()).collect()
    }
}

/// Registers check descriptors against one project.
pub struct CheckRegistrar<'a> {
    platform: &'a dyn EvalPlatform,
    project_id: &'a str,
}

impl<'a> CheckRegistrar<'a> {
    pub fn new(platform: &'a dyn EvalPlatform, project_id: &'a str) -> Self {
        Self {
            platform,
            project_id,
        }
    }

    /// Register every descriptor, continuing past individual failures.
    pub async fn register_all(&self, checks: &[CheckDescriptor]) -> RegistrationReport {
        let existing: HashSet<String> = match self.platform.list_checks().await {
            Ok(list) => list.into_iter().map(|c| c.name).collect(),
            Err(e) => {
                warn!("Could not list existing checks: {}", e);
                HashSet::new()
            }
        };

        let mut report = RegistrationReport::default();
        for check in checks {
            if existing.contains(&check.name) {
                info!("Updating check {}", check.name);
            } else {
                info!("Creating check {}", check.name);
            }

            match self.register(check).await {
                Ok(record) => {
                    info!(
                        "Check {} has been registered and is now available",
                        check.name
                    );
                    report.registered.push(record);
                }
                Err(e) => {
                    warn!("Error registering checks: {}", e);
                    report.failed.push(CheckFailure {
                        name: check.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Create or update a single check.
    ///
    /// A prompt is uploaded verbatim. Without one, grading code is generated
    /// first and uploaded in its place.
    pub async fn register(&self, check: &CheckDescriptor) -> Result<CheckRecord> {
        let check_config = match &check.prompt {
            Some(prompt) => CheckConfig::Prompt {
                prompt_template: prompt.clone(),
                output_type: check.output_data_type,
            },
            None => {
                let request = CheckGenerateRequest {
                    project_id: self.project_id.to_string(),
                    name: check.name.clone(),
                    description: check.description.clone(),
                    output_data_type: check.output_data_type,
                    requires_scenario_input: check.requires_scenario_input,
                    requires_scenario_result: check.requires_scenario_result,
                };
                let generated = self
                    .platform
                    .generate_check(&request)
                    .await
                    .map_err(|source| FlowError::CheckUpload {
                        name: check.name.clone(),
                        source,
                    })?;
                if generated.generated_code.trim().is_empty() {
                    return Err(FlowError::EmptyGeneratedCheck {
                        name: check.name.clone(),
                    });
                }
                debug!(
                    "Generated {} bytes of grading code for {}",
                    generated.generated_code.len(),
                    check.name
                );
                CheckConfig::Code {
                    code_contents: generated.generated_code,
                    output_type: check.output_data_type,
                }
            }
        };

        let upsert = CheckUpsert {
            project_id: self.project_id.to_string(),
            name: check.name.clone(),
            description: check.description.clone(),
            check_config,
        };
        self.platform
            .upsert_check(&upsert)
            .await
            .map_err(|source| FlowError::CheckUpload {
                name: check.name.clone(),
                source,
            })
    }
}
