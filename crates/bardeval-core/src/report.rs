//! Post-run threshold summaries.
//!
//! The policy never fails a run. It only annotates what the platform
//! already computed so the console output shows which minimums were missed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::RunResult;

/// Minimum acceptable value per metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub metrics_min: BTreeMap<String, f64>,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new().with_min("fluency", 4.0)
    }
}

impl ThresholdPolicy {
    /// Empty policy, no minimums.
    pub fn new() -> Self {
        Self {
            metrics_min: BTreeMap::new(),
        }
    }

    pub fn with_min(mut self, metric: impl Into<String>, min: f64) -> Self {
        self.metrics_min.insert(metric.into(), min);
        self
    }

    /// Compare a run's mean scores to the configured minimums.
    ///
    /// A policy name matches a score key equal to it, or failing that the
    /// first key (in sorted order) starting with it, so `fluency` picks up
    /// `fluency_summary`.
    pub fn evaluate(&self, run: &RunResult) -> ReportSummary {
        let empty = BTreeMap::new();
        let scores = run
            .model_metrics
            .as_ref()
            .map(|m| &m.mean_scores)
            .unwrap_or(&empty);

        let mut metrics = Vec::new();
        let mut violations = Vec::new();
        let mut missing = Vec::new();

        for (metric, min) in &self.metrics_min {
            let actual = scores.get(metric).copied().or_else(|| {
                scores
                    .iter()
                    .find(|(key, _)| key.starts_with(metric.as_str()))
                    .map(|(_, v)| *v)
            });

            match actual {
                Some(value) => {
                    let passed = value >= *min;
                    if !passed {
                        violations.push(format!(
                            "{} scored {:.2}, below minimum {:.2}",
                            metric, value, min
                        ));
                    }
                    metrics.push(MetricOutcome {
                        metric: metric.clone(),
                        min: *min,
                        actual: Some(value),
                        passed,
                    });
                }
                None => {
                    missing.push(metric.clone());
                    metrics.push(MetricOutcome {
                        metric: metric.clone(),
                        min: *min,
                        actual: None,
                        passed: false,
                    });
                }
            }
        }

        ReportSummary {
            run_id: run.id.clone(),
            run_name: run.name.clone(),
            app_link: run.app_link.clone(),
            metrics,
            violations,
            missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricOutcome {
    pub metric: String,
    pub min: f64,
    pub actual: Option<f64>,
    pub passed: bool,
}

/// Informational view of one run against a [`ThresholdPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub run_id: String,
    pub run_name: String,
    pub app_link: String,
    pub metrics: Vec<MetricOutcome>,
    pub violations: Vec<String>,
    /// Policy metrics the platform did not report
    pub missing: Vec<String>,
}

impl ReportSummary {
    pub fn within_thresholds(&self) -> bool {
        self.violations.is_empty() && self.missing.is_empty()
    }

    /// Direct link to the hosted report.
    pub fn link_line(&self, label: &str) -> String {
        format!("See {} results in Okareo: {}", label, self.app_link)
    }

    /// Console rendering: link line followed by one line per metric.
    pub fn render(&self, label: &str) -> String {
        let mut out = self.link_line(label);
        for m in &self.metrics {
            let status = if m.passed { "ok" } else { "below" };
            match m.actual {
                Some(v) => out.push_str(&format!(
                    "\n  {} {:.2} (min {:.2}) {}",
                    m.metric, v, m.min, status
                )),
                None => out.push_str(&format!(
                    "\n  {} not reported (min {:.2})",
                    m.metric, m.min
                )),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ModelMetrics;

    fn run_with(scores: &[(&str, f64)]) -> RunResult {
        RunResult {
            id: "run-1".to_string(),
            name: "Base Text Generator Eval local.1".to_string(),
            scenario_set_id: "sc-1".to_string(),
            model_id: Some("m-1".to_string()),
            app_link: "https://app.okareo.com/project/p/eval/run-1".to_string(),
            model_metrics: Some(ModelMetrics {
                mean_scores: scores
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            }),
        }
    }

    #[test]
    fn default_policy_requires_fluency_four() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.metrics_min.get("fluency"), Some(&4.0));
    }

    #[test]
    fn prefix_match_picks_summary_metric() {
        let summary = ThresholdPolicy::default().evaluate(&run_with(&[("fluency_summary", 4.5)]));
        assert!(summary.within_thresholds());
        assert_eq!(summary.metrics[0].actual, Some(4.5));
    }

    #[test]
    fn exact_match_wins_over_prefix() {
        let summary = ThresholdPolicy::default()
            .evaluate(&run_with(&[("fluency", 3.0), ("fluency_summary", 4.8)]));
        assert!(!summary.within_thresholds());
        assert_eq!(summary.violations.len(), 1);
        assert!(summary.violations[0].contains("3.00"));
    }

    #[test]
    fn missing_metric_is_listed_not_violated() {
        let summary = ThresholdPolicy::default().evaluate(&run_with(&[("custom.Poetic", 2.0)]));
        assert_eq!(summary.missing, vec!["fluency".to_string()]);
        assert!(summary.violations.is_empty());
        assert!(!summary.within_thresholds());
    }

    #[test]
    fn no_metrics_at_all() {
        let mut run = run_with(&[]);
        run.model_metrics = None;
        let summary = ThresholdPolicy::default().evaluate(&run);
        assert_eq!(summary.missing.len(), 1);
    }

    #[test]
    fn render_starts_with_link_line() {
        let summary = ThresholdPolicy::default().evaluate(&run_with(&[("fluency_summary", 3.5)]));
        let text = summary.render("base");
        assert!(text.starts_with(
            "See base results in Okareo: https://app.okareo.com/project/p/eval/run-1"
        ));
        assert!(text.contains("fluency 3.50 (min 4.00) below"));
    }
}
