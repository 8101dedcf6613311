//! Scenario report — interchange format for run results
//!
//! One `StepOutcome` per scenario step; the CLI renders the report to the
//! terminal or emits it as JSON. The JSON Schema export keeps downstream
//! consumers (CI annotations, dashboards) pinned to the format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of one scenario step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not run because an earlier step it depends on failed.
    Skipped,
}

impl StepStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executed (or skipped) scenario step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StepOutcome {
    /// Step name, e.g. "verify published api description"
    pub name: String,
    pub status: StepStatus,
    /// Pass detail or failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepOutcome {
    #[must_use]
    pub fn passed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Passed,
            detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Skipped,
            detail: None,
        }
    }
}

/// Complete result of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioReport {
    /// Base URL the scenario ran against.
    pub base_url: String,
    pub steps: Vec<StepOutcome>,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Wall-clock duration of the run in seconds.
    pub duration_secs: f64,
}

impl ScenarioReport {
    /// Assemble a report from recorded steps, counting statuses.
    #[must_use]
    pub fn new(base_url: impl Into<String>, steps: Vec<StepOutcome>, duration_secs: f64) -> Self {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for step in &steps {
            match step.status {
                StepStatus::Passed => passed += 1,
                StepStatus::Failed => failed += 1,
                StepStatus::Skipped => skipped += 1,
            }
        }
        Self {
            base_url: base_url.into(),
            steps,
            passed,
            failed,
            skipped,
            duration_secs,
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code: 0 all green, 1 any failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }
}

/// Generate JSON Schema for the report format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(ScenarioReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_statuses() {
        let report = ScenarioReport::new(
            "http://localhost:8000",
            vec![
                StepOutcome::passed("a", "ok"),
                StepOutcome::failed("b", "expected status 200, got 500"),
                StepOutcome::skipped("c"),
                StepOutcome::skipped("d"),
            ],
            1.25,
        );
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 2);
        assert!(report.has_failures());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn green_report_exits_zero() {
        let report = ScenarioReport::new(
            "http://localhost:8000",
            vec![StepOutcome::passed("a", "ok")],
            0.5,
        );
        assert!(!report.has_failures());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn status_serialization() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Skipped).unwrap(),
            "\"skipped\""
        );
        let parsed: StepStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, StepStatus::Failed);
    }

    #[test]
    fn skipped_step_omits_detail() {
        let json = serde_json::to_value(StepOutcome::skipped("x")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "x", "status": "skipped"}));
    }

    #[test]
    fn schema_generation_produces_valid_json() {
        let schema = generate_schema();
        let parsed: serde_json::Value = serde_json::from_str(&schema).unwrap();
        assert!(parsed.get("$schema").is_some() || parsed.get("type").is_some());
        assert_eq!(
            parsed.get("title").and_then(|v| v.as_str()),
            Some("ScenarioReport")
        );
    }
}
