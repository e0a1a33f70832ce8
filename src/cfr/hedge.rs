//! NormalHedge potential and scale calibration.
//!
//! NormalHedge weighs an action with clipped cumulative regret `r` by
//!
//! ```text
//! w(r, c) = (r / c) * exp(r^2 / (2c))
//! ```
//!
//! where the scale `c > 0` is chosen so that the mean potential
//! `exp(r^2 / (2c))` over all actions equals `e`. The mean potential is
//! strictly decreasing in `c`, so the scale is found by bisection.
//!
//! Reference: Chaudhuri, Freund, Hsu. "A Parameter-free Hedging Algorithm" (2009).

use std::f64::consts::E;

/// Largest exponent passed to `exp`; `exp(700)` is still finite.
pub const MAX_EXPONENT: f64 = 700.0;

/// Scale returned when no action has positive regret.
pub const PLACEHOLDER_SCALE: f64 = 1.0;

/// Bisection steps before settling for the bracket midpoint.
pub const BISECTION_STEPS: usize = 60;

/// Absolute tolerance on the mean potential.
pub const TOLERANCE: f64 = 1e-10;

const LOWER_BRACKET: f64 = 1e-12;
const UPPER_BRACKET_CAP: f64 = 1e12;
const MAX_EXPANSIONS: usize = 100;

/// Potential `exp(r^2 / 2c)` with the exponent clamped at [`MAX_EXPONENT`].
#[inline]
pub fn potential(regret: f64, scale: f64) -> f64 {
    let exponent = (regret * regret) / (2.0 * scale);
    exponent.min(MAX_EXPONENT).exp()
}

/// Mean potential over all actions for a given scale.
pub fn mean_potential(clipped: &[f64], scale: f64) -> f64 {
    if clipped.is_empty() {
        return 0.0;
    }
    clipped.iter().map(|&r| potential(r, scale)).sum::<f64>() / clipped.len() as f64
}

/// Find the scale `c` at which the mean potential of `clipped` equals `e`.
///
/// `clipped` must already be the positive part of cumulative regret. If no
/// entry is positive there is nothing to calibrate and [`PLACEHOLDER_SCALE`]
/// is returned. The search runs on regrets normalized by their maximum (the
/// potential depends only on `r^2 / c`), which keeps the bracket well away
/// from the exponent clamp for any regret magnitude; the result is scaled back.
///
/// If bisection does not reach [`TOLERANCE`] within [`BISECTION_STEPS`], the
/// midpoint of the final bracket is returned. The rescaled result is kept
/// within `[f64::MIN_POSITIVE, f64::MAX]`, so the scale stays positive even
/// for regrets whose square underflows.
pub fn solve_scale(clipped: &[f64]) -> f64 {
    let max = clipped.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 || !max.is_finite() {
        return PLACEHOLDER_SCALE;
    }

    let normalized: Vec<f64> = clipped.iter().map(|&r| r.max(0.0) / max).collect();
    let scale = bisect(&normalized) * max * max;
    if scale.is_nan() || scale < f64::MIN_POSITIVE {
        f64::MIN_POSITIVE
    } else {
        scale.min(f64::MAX)
    }
}

/// Bisection on normalized regrets (maximum entry exactly 1).
fn bisect(normalized: &[f64]) -> f64 {
    let mut lo = LOWER_BRACKET;
    let mut hi = 1.0;

    // Expand until the potential at the upper bracket has dropped to e.
    for _ in 0..MAX_EXPANSIONS {
        if mean_potential(normalized, hi) <= E {
            break;
        }
        hi *= 2.0;
        if hi >= UPPER_BRACKET_CAP {
            hi = UPPER_BRACKET_CAP;
            break;
        }
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let value = mean_potential(normalized, mid);

        if (value - E).abs() < TOLERANCE {
            return mid;
        }

        if value > E {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    0.5 * (lo + hi)
}

/// Unnormalized NormalHedge weights for clipped regrets at scale `c`.
///
/// Actions without positive regret get zero weight.
pub fn weights(clipped: &[f64], scale: f64) -> Vec<f64> {
    clipped
        .iter()
        .map(|&r| {
            if r > 0.0 {
                (r / scale) * potential(r, scale)
            } else {
                0.0
            }
        })
        .collect()
}
