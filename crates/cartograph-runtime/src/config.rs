//! Runtime configuration.

use std::time::Duration;

use cartograph_core::{CartographConfig, DEFAULT_FALLBACK_RATIO};

/// Configuration for the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Delay between revealed nodes.
    pub reveal_interval: Duration,
    /// Recovered/file ratio below which placeholder nodes are synthesized.
    pub fallback_ratio: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(60),
            fallback_ratio: DEFAULT_FALLBACK_RATIO,
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the runtime settings out of a loaded configuration.
    pub fn from_config(config: &CartographConfig) -> Self {
        Self::new()
            .with_reveal_interval(config.reveal_interval)
            .with_fallback_ratio(config.fallback_ratio)
    }

    /// Sets the reveal interval. Zero is raised to one millisecond.
    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Sets the fallback ratio.
    pub fn with_fallback_ratio(mut self, ratio: f64) -> Self {
        self.fallback_ratio = ratio;
        self
    }
}
