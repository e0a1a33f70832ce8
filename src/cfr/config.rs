//! Configuration options for the trainer.
//!
//! This module provides configuration structs that select the engine
//! (CFR, CFR+, NormalHedge, NormalHedge+), its traversal, the CFR+ averaging
//! delay and the random seed.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cfr::algorithm::{Algorithm, Traversal};

/// Configuration for the trainer.
///
/// # Example
/// ```
/// use kuhn_regret::cfr::{Algorithm, Traversal, TrainerConfig};
///
/// let config = TrainerConfig::cfr_plus(100).with_seed(7);
/// assert_eq!(config.algorithm, Algorithm::CfrPlus);
/// assert_eq!(config.traversal(), Traversal::Alternating);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Engine used at every information set.
    pub algorithm: Algorithm,

    /// Traversal override. `None` uses the engine's default
    /// (simultaneous for CFR/NormalHedge, alternating for the `+` variants).
    #[serde(default)]
    pub traversal: Option<Traversal>,

    /// Averaging delay `d` for CFR+: iteration `t` averages with weight
    /// `max(t - d, 0)`. Ignored by the other engines.
    #[serde(default)]
    pub delay: u64,

    /// Random seed for reproducibility.
    ///
    /// If set, card dealing is reproducible: two runs with the same seed
    /// produce bit-identical value sequences. If `None`, a random seed is used.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::cfr()
    }
}

impl TrainerConfig {
    /// Configuration for `algorithm` with its default traversal.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            traversal: None,
            delay: 0,
            seed: None,
        }
    }

    /// Vanilla CFR with simultaneous traversal.
    pub fn cfr() -> Self {
        Self::new(Algorithm::Cfr)
    }

    /// CFR+ with alternating traversal and averaging delay `delay`.
    pub fn cfr_plus(delay: u64) -> Self {
        Self {
            delay,
            ..Self::new(Algorithm::CfrPlus)
        }
    }

    /// NormalHedge with simultaneous traversal.
    pub fn normal_hedge() -> Self {
        Self::new(Algorithm::NormalHedge)
    }

    /// NormalHedge+ with alternating traversal.
    pub fn normal_hedge_plus() -> Self {
        Self::new(Algorithm::NormalHedgePlus)
    }

    /// Builder method: override the traversal.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = Some(traversal);
        self
    }

    /// Builder method: set the CFR+ averaging delay.
    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective traversal.
    pub fn traversal(&self) -> Traversal {
        self.traversal
            .unwrap_or_else(|| self.algorithm.default_traversal())
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay > 0 && self.algorithm != Algorithm::CfrPlus {
            return Err(ConfigError::InvalidValue {
                field: "delay",
                message: format!("delay {} only applies to CFR+, not {}", self.delay, self.algorithm),
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds a value outside its domain.
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Explanation.
        message: String,
    },
    /// The configuration file could not be read.
    Io(String),
    /// The configuration could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, message } => {
                write!(f, "invalid {}: {}", field, message)
            }
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Latest exploitability measurement (if calculated).
    pub exploitability: Option<f64>,

    /// History of exploitability measurements.
    pub exploitability_history: Vec<ExploitabilityPoint>,
}

/// A single exploitability measurement at a specific iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploitabilityPoint {
    /// Iteration number when this measurement was taken.
    pub iteration: u64,
    /// Exploitability value (chips per hand).
    pub exploitability: f64,
}

impl TrainingStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record an exploitability measurement.
    pub fn record_exploitability(&mut self, iteration: u64, exploitability: f64) {
        self.exploitability = Some(exploitability);
        self.exploitability_history.push(ExploitabilityPoint {
            iteration,
            exploitability,
        });
    }
}
