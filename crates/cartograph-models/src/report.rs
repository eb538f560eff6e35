//! Report kinds and the structured objects each one yields.
//!
//! Every type here is read leniently: the model is free to omit any field,
//! so everything defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a scan request asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Architecture graph plus summary.
    #[default]
    Architecture,
    /// Free-text answer to a question.
    Query,
    /// Security audit.
    Security,
    /// New-developer walkthrough.
    Onboarding,
    /// GPU/CUDA performance analysis.
    Performance,
}

impl ReportKind {
    /// Endpoint path on the analysis service.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ReportKind::Architecture => "/api/v1/analyze",
            ReportKind::Query => "/api/v1/query",
            ReportKind::Security => "/api/v1/security",
            ReportKind::Onboarding => "/api/v1/onboarding",
            ReportKind::Performance => "/api/v1/cuda",
        }
    }

    /// Returns true if the result is a graph and goes through reconciliation.
    pub fn produces_graph(&self) -> bool {
        matches!(self, ReportKind::Architecture)
    }

    /// Returns true if the payload is expected to embed a structured object.
    pub fn is_structured(&self) -> bool {
        !matches!(self, ReportKind::Query)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Architecture => "architecture",
            ReportKind::Query => "query",
            ReportKind::Security => "security",
            ReportKind::Onboarding => "onboarding",
            ReportKind::Performance => "performance",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "architecture" | "analyze" => Ok(ReportKind::Architecture),
            "query" | "ask" => Ok(ReportKind::Query),
            "security" => Ok(ReportKind::Security),
            "onboarding" => Ok(ReportKind::Onboarding),
            "performance" | "cuda" | "gpu" => Ok(ReportKind::Performance),
            other => Err(format!("unknown report kind: {}", other)),
        }
    }
}

/// Overall architecture narrative accompanying a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureSummary {
    /// Overall architecture pattern name.
    pub pattern: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A single security finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vulnerability {
    /// One of "critical", "high", "medium", "low".
    pub severity: String,
    pub file: String,
    /// Approximate location description.
    pub line_hint: String,
    /// Vulnerability class (e.g., "SQL Injection").
    pub vulnerability: String,
    pub description: String,
    pub fix: String,
}

/// Security audit result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityReport {
    pub vulnerabilities: Vec<Vulnerability>,
    pub security_score: Option<f64>,
    pub summary: String,
    pub positive: Vec<String>,
}

impl SecurityReport {
    /// Counts findings with the given severity (case-insensitive).
    pub fn count_severity(&self, severity: &str) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity.eq_ignore_ascii_case(severity))
            .count()
    }
}

/// One stop on an onboarding walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingStep {
    pub order: u32,
    pub title: String,
    pub file: String,
    pub description: String,
    pub key_things: Vec<String>,
    pub next_hint: String,
}

/// New-developer walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingGuide {
    pub project_name: String,
    pub one_liner: String,
    pub tech_stack: Vec<String>,
    pub steps: Vec<OnboardingStep>,
    pub architecture_diagram: String,
    pub first_task: String,
    pub gotchas: Vec<String>,
}

impl OnboardingGuide {
    /// Steps sorted by their declared order.
    pub fn ordered_steps(&self) -> Vec<&OnboardingStep> {
        let mut steps: Vec<&OnboardingStep> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }
}

/// A GPU performance finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceFinding {
    pub category: String,
    pub severity: String,
    pub file: String,
    pub location: String,
    pub issue: String,
    pub impact: String,
    pub fix: String,
    pub estimated_speedup: String,
}

/// A suggested optimization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Optimization {
    pub title: String,
    pub description: String,
    pub effort: String,
    pub impact: String,
    pub code_hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryProfile {
    pub estimated_gpu_memory: String,
    pub bottlenecks: Vec<String>,
    pub recommendations: Vec<String>,
}

/// GPU/CUDA performance analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceReport {
    pub gpu_usage_detected: bool,
    pub framework: String,
    pub gpu_score: Option<f64>,
    pub findings: Vec<PerformanceFinding>,
    pub optimizations: Vec<Optimization>,
    pub memory_profile: MemoryProfile,
    pub summary: String,
}
