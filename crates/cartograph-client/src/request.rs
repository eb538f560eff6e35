//! Scan requests and the wire bodies the service expects.

use serde::{Deserialize, Serialize};

use cartograph_core::{resolve_target, CartographConfig};
use cartograph_models::{FileRecord, ReportKind, ScanMetadata};

/// One scan of a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub kind: ReportKind,
    /// Local directory or repository URL.
    pub target: String,
    pub question: Option<String>,
    pub api_key: Option<String>,
    pub max_files: u32,
    pub include_tests: bool,
    pub depth: u32,
}

impl ScanRequest {
    /// Creates a request using configured limits and key.
    pub fn new(kind: ReportKind, target: &str, config: &CartographConfig) -> Self {
        Self {
            kind,
            target: resolve_target(target),
            question: None,
            api_key: config.api_key.clone(),
            max_files: config.max_files,
            include_tests: config.include_tests,
            depth: config.depth,
        }
    }

    /// Creates a question request.
    pub fn query(target: &str, question: impl Into<String>, config: &CartographConfig) -> Self {
        Self::new(ReportKind::Query, target, config).with_question(question)
    }

    /// Sets the question.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Endpoint path for this request's kind.
    pub fn endpoint_path(&self) -> &'static str {
        self.kind.endpoint_path()
    }

    /// Serializable body.
    pub fn body(&self) -> RequestBody<'_> {
        RequestBody {
            directory_path: &self.target,
            nvidia_api_key: self.api_key.as_deref(),
            max_files: self.max_files,
            include_tests: self.include_tests,
            depth: self.depth,
            question: self.question.as_deref(),
        }
    }
}

/// JSON body posted to every scan endpoint.
#[derive(Debug, Serialize)]
pub struct RequestBody<'a> {
    pub directory_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvidia_api_key: Option<&'a str>,
    pub max_files: u32,
    pub include_tests: bool,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<&'a str>,
}

/// Ground truth returned by the preview endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub summary: ScanMetadata,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// Service status reported by the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    /// Model the service is configured with.
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub has_api_key: bool,
}

impl HealthStatus {
    /// Returns true if the service reports itself online.
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_field_names() {
        let config = CartographConfig::new().with_api_key("nvapi-x").with_max_files(40);
        let request = ScanRequest::new(ReportKind::Security, "https://github.com/acme/api", &config);

        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(
            body,
            json!({
                "directory_path": "https://github.com/acme/api",
                "nvidia_api_key": "nvapi-x",
                "max_files": 40,
                "include_tests": false,
                "depth": 6
            })
        );
        assert_eq!(request.endpoint_path(), "/api/v1/security");
    }

    #[test]
    fn test_query_body_carries_question() {
        let request = ScanRequest::query("/srv/app", "where is auth?", &CartographConfig::new());

        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body["question"], "where is auth?");
        assert!(body.get("nvidia_api_key").is_none());
        assert_eq!(request.endpoint_path(), "/api/v1/query");
    }

    #[test]
    fn test_preview_reads_scanner_shape() {
        let preview: Preview = serde_json::from_value(json!({
            "summary": {"name": "api", "total_files": 1, "total_lines": 40, "languages": {"Python": 40}},
            "files": [{
                "path": "/tmp/api/app.py",
                "relative_path": "app.py",
                "size_bytes": 900,
                "line_count": 40,
                "extension": ".py",
                "language": "Python",
                "language_color": "#3572A5",
                "last_modified": "2026-01-01T00:00:00",
                "imports": ["flask"],
                "complexity_score": 12.5,
                "has_tests": false
            }]
        }))
        .unwrap();

        assert_eq!(preview.summary.name, "api");
        assert_eq!(preview.files[0].relative_path, "app.py");
        assert_eq!(preview.files[0].complexity_score, 12.5);
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_value(json!({"status": "online", "engine": "nemotron", "version": "3.1.0"}))
                .unwrap();
        assert!(health.is_online());
        assert!(!health.has_api_key);
    }
}
