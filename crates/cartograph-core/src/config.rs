//! Configuration and state paths for Cartograph.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.cartograph/
//! ├── .env.local    # Secrets (API key)
//! └── exports/      # Saved graph exports
//! ```
//!
//! # Environment Variables
//!
//! - `CARTOGRAPH_STATE_DIR`: Override the base state directory
//! - `CARTOGRAPH_ENDPOINT`: Analysis service base URL
//! - `CARTOGRAPH_API_KEY`: Model API key (falls back to `NVIDIA_API_KEY`)
//! - `CARTOGRAPH_REVEAL_INTERVAL_MS`: Delay between revealed nodes
//! - `CARTOGRAPH_FALLBACK_RATIO`: Recovered/file ratio below which
//!   placeholder nodes are synthesized
//! - `CARTOGRAPH_MAX_FILES`: Maximum files per scan

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::reconcile::DEFAULT_FALLBACK_RATIO;

pub const STATE_DIR_ENV: &str = "CARTOGRAPH_STATE_DIR";
pub const ENDPOINT_ENV: &str = "CARTOGRAPH_ENDPOINT";
pub const API_KEY_ENV: &str = "CARTOGRAPH_API_KEY";
/// Key name used by the model provider itself.
pub const PROVIDER_API_KEY_ENV: &str = "NVIDIA_API_KEY";
pub const REVEAL_INTERVAL_ENV: &str = "CARTOGRAPH_REVEAL_INTERVAL_MS";
pub const FALLBACK_RATIO_ENV: &str = "CARTOGRAPH_FALLBACK_RATIO";
pub const MAX_FILES_ENV: &str = "CARTOGRAPH_MAX_FILES";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(60);
pub const DEFAULT_MAX_FILES: u32 = 120;
pub const MAX_FILES_LIMIT: u32 = 500;
pub const DEFAULT_DEPTH: u32 = 6;
pub const MAX_DEPTH: u32 = 15;

const DEFAULT_STATE_DIR: &str = ".cartograph";
const EXPORTS_SUBDIR: &str = "exports";

/// Get the Cartograph state directory.
///
/// `CARTOGRAPH_STATE_DIR` if set, else `~/.cartograph`, else
/// `.cartograph` in the current directory.
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(|dir| expand_path(&dir))
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the exports directory.
pub fn exports_dir() -> PathBuf {
    state_dir().join(EXPORTS_SUBDIR)
}

/// Get the .env.local file path.
pub fn env_file() -> PathBuf {
    state_dir().join(".env.local")
}

/// Loads `.env.local` from the working directory, then from the state
/// directory. Variables already set are never overridden.
pub fn load_env_files() {
    for path in [PathBuf::from(".env.local"), env_file()] {
        match dotenvy::from_path(&path) {
            Ok(()) => debug!(path = %path.display(), "loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!(path = %path.display(), error = %e, "skipped environment file"),
        }
    }
}

/// Expands `~` and environment variables in a local path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Returns true if `target` names a remote repository rather than a
/// local directory.
pub fn is_repository_url(target: &str) -> bool {
    let target = target.trim();
    target.starts_with("https://") || target.starts_with("http://") || target.starts_with("git@")
}

/// Normalizes a scan target: URLs pass through, local paths are expanded.
pub fn resolve_target(target: &str) -> String {
    if is_repository_url(target) {
        target.trim().to_string()
    } else {
        expand_path(target.trim()).display().to_string()
    }
}

/// Parses and validates an analysis endpoint.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };
    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

/// Settings shared by the client, the pipeline and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct CartographConfig {
    /// Analysis service base URL.
    pub endpoint: Url,
    /// Model API key forwarded with each request.
    pub api_key: Option<String>,
    /// Delay between revealed nodes.
    pub reveal_interval: Duration,
    /// Recovered/file ratio below which placeholders are synthesized.
    pub fallback_ratio: f64,
    pub max_files: u32,
    pub include_tests: bool,
    /// Directory depth scanned.
    pub depth: u32,
}

impl Default for CartographConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("Invalid default endpoint"),
            api_key: None,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            fallback_ratio: DEFAULT_FALLBACK_RATIO,
            max_files: DEFAULT_MAX_FILES,
            include_tests: false,
            depth: DEFAULT_DEPTH,
        }
    }
}

impl CartographConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = get(ENDPOINT_ENV) {
            config.endpoint = parse_endpoint(&endpoint)?;
        }
        config.api_key = get(API_KEY_ENV).or_else(|| get(PROVIDER_API_KEY_ENV));

        if let Some(raw) = get(REVEAL_INTERVAL_ENV) {
            let millis: u64 = parse_value(REVEAL_INTERVAL_ENV, &raw)?;
            config.reveal_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = get(FALLBACK_RATIO_ENV) {
            let ratio: f64 = parse_value(FALLBACK_RATIO_ENV, &raw)?;
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::InvalidValue {
                    key: FALLBACK_RATIO_ENV.to_string(),
                    value: raw,
                });
            }
            config.fallback_ratio = ratio;
        }
        if let Some(raw) = get(MAX_FILES_ENV) {
            let max: u32 = parse_value(MAX_FILES_ENV, &raw)?;
            config = config.with_max_files(max);
        }

        Ok(config)
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the reveal interval.
    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    /// Sets the fallback ratio.
    pub fn with_fallback_ratio(mut self, ratio: f64) -> Self {
        self.fallback_ratio = ratio;
        self
    }

    /// Sets the file limit, clamped to 1..=500.
    pub fn with_max_files(mut self, max: u32) -> Self {
        self.max_files = max.clamp(1, MAX_FILES_LIMIT);
        self
    }

    /// Sets whether test files are scanned.
    pub fn with_include_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    /// Sets the scan depth, clamped to 1..=15.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.clamp(1, MAX_DEPTH);
        self
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
        self.endpoint
            .join(path)
            .map_err(|e| ConfigError::InvalidEndpoint {
                endpoint: format!("{}{}", self.endpoint, path),
                reason: e.to_string(),
            })
    }

    /// Default location for an export file.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        exports_dir().join(Path::new(file_name))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
