//! Domain entities for the SonarQube webhook payload.
//!
//! Every field is optional at the parsing layer so that a partial payload
//! still deserializes; [`AnalysisReport::validate`] then checks the fields
//! the card cannot be built without and reports the first one missing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::{GateCardError, Result};

/// Quality gate status reported when every condition passed.
pub const GATE_STATUS_OK: &str = "OK";

/// Analysed project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    /// SonarQube project key.
    pub key: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Project dashboard URL.
    pub url: Option<String>,
}

/// Branch or pull request the analysis ran on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Branch name, or the pull request number for PR analyses.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: Option<String>,
    /// Branch kind as reported by SonarQube (`PULL_REQUEST`, `BRANCH`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Whether this is the main branch.
    pub is_main: Option<bool>,
    /// Dashboard URL for this branch.
    pub url: Option<String>,
}

/// One metric check within a quality gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Metric identifier, e.g. `new_coverage`.
    #[serde(default)]
    pub metric: String,
    /// Comparison operator (`GREATER_THAN`, `LESS_THAN`).
    pub operator: Option<String>,
    /// Condition status (`OK`, `ERROR`, `NO_VALUE`).
    pub status: Option<String>,
    /// Observed value.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: Option<String>,
    /// Threshold that fails the condition.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub error_threshold: Option<String>,
}

/// Quality gate verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QualityGate {
    /// Gate name.
    pub name: Option<String>,
    /// Overall status (`OK` or `ERROR`).
    pub status: Option<String>,
    /// Condition checks, in the order SonarQube reported them.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Webhook payload posted by SonarQube after an analysis completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Base URL of the SonarQube server.
    pub server_url: Option<String>,
    /// Background task identifier.
    pub task_id: Option<String>,
    /// Background task status.
    pub status: Option<String>,
    /// Analysis timestamp, e.g. `2024-05-01T08:30:00+0000`.
    pub analysed_at: Option<String>,
    /// Analysed revision (commit SHA).
    pub revision: Option<String>,
    /// Analysed project.
    pub project: Option<Project>,
    /// Analysed branch or pull request.
    pub branch: Option<Branch>,
    /// Quality gate verdict.
    pub quality_gate: Option<QualityGate>,
}

/// Kind of branch an analysis ran on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BranchKind {
    /// A pull request analysis.
    PullRequest,
    /// A long-lived or feature branch analysis.
    Branch,
}

impl BranchKind {
    /// Parse SonarQube's branch type, defaulting to a pull request.
    pub fn from_sonar(value: Option<&str>) -> Self {
        match value {
            Some(kind) if kind.eq_ignore_ascii_case("BRANCH") => BranchKind::Branch,
            _ => BranchKind::PullRequest,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BranchKind::PullRequest => "Pull Request",
            BranchKind::Branch => "Branch",
        }
    }
}

/// A report whose required fields have been checked.
#[derive(Debug, Clone, Copy)]
pub struct CheckedReport<'a> {
    /// Project display name.
    pub project_name: &'a str,
    /// Branch name or PR number.
    pub branch_name: &'a str,
    /// Branch kind.
    pub branch_kind: BranchKind,
    /// Dashboard URL for the card button.
    pub dashboard_url: &'a str,
    /// Quality gate status.
    pub gate_status: &'a str,
    /// Conditions in input order.
    pub conditions: &'a [Condition],
    /// Analysed revision, if reported.
    pub revision: Option<&'a str>,
    /// Raw analysis timestamp, if reported.
    pub analysed_at: Option<&'a str>,
}

impl CheckedReport<'_> {
    /// Whether the quality gate passed.
    pub fn passed(&self) -> bool {
        self.gate_status == GATE_STATUS_OK
    }
}

impl AnalysisReport {
    /// Parse a webhook body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Check the fields required to build a card.
    pub fn validate(&self) -> Result<CheckedReport<'_>> {
        let project = self
            .project
            .as_ref()
            .ok_or(GateCardError::MissingField("project"))?;
        let branch = self
            .branch
            .as_ref()
            .ok_or(GateCardError::MissingField("branch"))?;
        let gate = self
            .quality_gate
            .as_ref()
            .ok_or(GateCardError::MissingField("qualityGate"))?;

        let project_name =
            non_blank(&project.name).ok_or(GateCardError::MissingField("project.name"))?;
        let branch_name =
            non_blank(&branch.name).ok_or(GateCardError::MissingField("branch.name"))?;
        let gate_status =
            non_blank(&gate.status).ok_or(GateCardError::MissingField("qualityGate.status"))?;
        let dashboard_url = non_blank(&branch.url)
            .or_else(|| non_blank(&project.url))
            .ok_or(GateCardError::MissingField("branch.url"))?;

        Ok(CheckedReport {
            project_name,
            branch_name,
            branch_kind: BranchKind::from_sonar(branch.kind.as_deref()),
            dashboard_url,
            gate_status,
            conditions: &gate.conditions,
            revision: non_blank(&self.revision),
            analysed_at: non_blank(&self.analysed_at),
        })
    }
}

/// Accept a JSON string, number or bool, keeping its textual form.
fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
