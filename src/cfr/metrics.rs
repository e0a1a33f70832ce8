//! Summaries of per-iteration value sequences.

use serde::{Deserialize, Serialize};

/// Convergence summary of one training run's value sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSummary {
    /// Number of values summarized.
    pub iterations: usize,
    /// Mean over every value (final running average).
    pub mean: f64,
    /// Number of trailing values in the tail statistics.
    pub tail_window: usize,
    /// Mean of the trailing window.
    pub tail_mean: f64,
    /// Population standard deviation of the trailing window.
    pub tail_std: f64,
    /// Known equilibrium value, if any.
    pub reference: Option<f64>,
    /// `|mean - reference|`.
    pub error: Option<f64>,
}

impl ConvergenceSummary {
    /// Summarize `values` against an optional reference value.
    pub fn from_values(values: &[f64], reference: Option<f64>) -> Self {
        let window = tail_window(values.len());
        let tail = &values[values.len() - window..];
        let tail_mean = mean(tail);
        let tail_std = if tail.is_empty() {
            0.0
        } else {
            (tail.iter().map(|v| (v - tail_mean).powi(2)).sum::<f64>() / tail.len() as f64).sqrt()
        };
        let mean = mean(values);

        Self {
            iterations: values.len(),
            mean,
            tail_window: window,
            tail_mean,
            tail_std,
            reference,
            error: reference.map(|r| (mean - r).abs()),
        }
    }
}

/// Trailing window used for tail statistics: `max(100, n / 10)`, capped at `n`.
pub fn tail_window(n: usize) -> usize {
    (n / 10).max(100).min(n)
}

/// Mean of the last `window` values (all of them if fewer); 0.0 when empty.
pub fn tail_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

/// Cumulative average after each value.
pub fn running_average(values: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            total += v;
            total / (i + 1) as f64
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
