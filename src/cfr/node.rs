//! Per-information-set statistics.
//!
//! A [`DecisionPoint`] holds the cumulative regret, the cumulative weighted
//! strategy and the cached current strategy for one information set. The
//! [`Algorithm`] tag selects the regret-folding and strategy rules.

use serde::{Deserialize, Serialize};

use crate::cfr::algorithm::{Algorithm, StrategyRule};
use crate::cfr::hedge;

/// Statistics for a single information set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPoint {
    algorithm: Algorithm,
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
    strategy: Vec<f64>,
    /// Last calibrated NormalHedge scale (unused by regret matching).
    scale: f64,
}

impl DecisionPoint {
    /// Fresh statistics for `num_actions` actions.
    ///
    /// The cached strategy starts uniform.
    pub fn new(algorithm: Algorithm, num_actions: usize) -> Self {
        Self {
            algorithm,
            regret_sum: vec![0.0; num_actions],
            strategy_sum: vec![0.0; num_actions],
            strategy: uniform(num_actions),
            scale: hedge::PLACEHOLDER_SCALE,
        }
    }

    /// Number of actions at this information set.
    pub fn num_actions(&self) -> usize {
        self.regret_sum.len()
    }

    /// Recompute the behavioral strategy from cumulative regret and cache it.
    ///
    /// Always a valid distribution: falls back to uniform when no action has
    /// positive regret.
    pub fn current_strategy(&mut self) -> &[f64] {
        let n = self.num_actions();
        debug_assert!(
            !self.algorithm.floors_regret() || self.regret_sum.iter().all(|&r| r >= 0.0),
            "floored regret went negative: {:?}",
            self.regret_sum
        );
        let positive: Vec<f64> = self.regret_sum.iter().map(|&r| r.max(0.0)).collect();

        let weights = match self.algorithm.strategy_rule() {
            StrategyRule::RegretMatching => positive,
            StrategyRule::NormalHedge => {
                if positive.iter().all(|&r| r <= 0.0) {
                    self.scale = hedge::PLACEHOLDER_SCALE;
                    vec![0.0; n]
                } else {
                    self.scale = hedge::solve_scale(&positive);
                    hedge::weights(&positive, self.scale)
                }
            }
        };

        self.strategy = normalize(&weights).unwrap_or_else(|| uniform(n));
        &self.strategy
    }

    /// Strategy cached by the last call to [`current_strategy`](Self::current_strategy).
    pub fn cached_strategy(&self) -> &[f64] {
        &self.strategy
    }

    /// Fold one instantaneous regret into the cumulative regret of `action`.
    ///
    /// Floored variants apply `max(old + delta, 0)`; the others add the raw
    /// signed value.
    pub fn accumulate_regret(&mut self, action: usize, delta: f64) {
        let updated = self.regret_sum[action] + delta;
        self.regret_sum[action] = if self.algorithm.floors_regret() {
            updated.max(0.0)
        } else {
            updated
        };
    }

    /// Add `weight` times the cached current strategy to the strategy sum.
    pub fn accumulate_strategy_mass(&mut self, weight: f64) {
        for (sum, &p) in self.strategy_sum.iter_mut().zip(self.strategy.iter()) {
            *sum += weight * p;
        }
    }

    /// Time-averaged strategy; uniform if no positive mass was accumulated.
    pub fn average_strategy(&self) -> Vec<f64> {
        normalize(&self.strategy_sum).unwrap_or_else(|| uniform(self.num_actions()))
    }

    /// Cumulative regret per action.
    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative weighted strategy per action.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Last calibrated NormalHedge scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Uniform distribution over `n` actions.
pub fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Normalize non-negative weights; `None` if their sum is not a positive finite number.
fn normalize(weights: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        Some(weights.iter().map(|&w| w / total).collect())
    } else {
        None
    }
}
