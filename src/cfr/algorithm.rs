//! Algorithm and traversal selection.
//!
//! The four engines share one statistics type and one trainer; they differ
//! only in how cumulative regret is folded, how a strategy is derived from
//! it, and which traversal drives the updates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The regret-minimization engine used at every decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Vanilla CFR: regret matching over unclipped cumulative regret.
    Cfr,
    /// CFR+: regret matching+ with floored regret and delayed linear averaging.
    CfrPlus,
    /// NormalHedge: half-normal potential over the positive part of regret.
    NormalHedge,
    /// NormalHedge+: NormalHedge weights over floored regret.
    NormalHedgePlus,
}

/// How a strategy is derived from cumulative regret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyRule {
    /// Proportional to positive cumulative regret.
    RegretMatching,
    /// Proportional to `(r/c) * exp(r^2 / 2c)` with `c` calibrated per node.
    NormalHedge,
}

/// How the trainer walks the tree each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// Both players update regrets and strategy sums in one pass.
    Simultaneous,
    /// One player updates regrets per iteration; the other accumulates
    /// strategy mass. The updating player alternates by iteration parity.
    Alternating,
}

impl Algorithm {
    /// All engines, in comparison order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Cfr,
        Algorithm::CfrPlus,
        Algorithm::NormalHedge,
        Algorithm::NormalHedgePlus,
    ];

    /// Whether cumulative regret is floored at zero after every update.
    pub fn floors_regret(self) -> bool {
        matches!(self, Algorithm::CfrPlus | Algorithm::NormalHedgePlus)
    }

    /// Rule mapping cumulative regret to a behavioral strategy.
    pub fn strategy_rule(self) -> StrategyRule {
        match self {
            Algorithm::Cfr | Algorithm::CfrPlus => StrategyRule::RegretMatching,
            Algorithm::NormalHedge | Algorithm::NormalHedgePlus => StrategyRule::NormalHedge,
        }
    }

    /// Traversal used when the configuration does not override it.
    pub fn default_traversal(self) -> Traversal {
        match self {
            Algorithm::Cfr | Algorithm::NormalHedge => Traversal::Simultaneous,
            Algorithm::CfrPlus | Algorithm::NormalHedgePlus => Traversal::Alternating,
        }
    }

    /// Strategy-averaging weight for 1-indexed iteration `t` in the
    /// alternating traversal.
    ///
    /// CFR+ uses `max(t - delay, 0)`; the other engines average uniformly.
    pub fn averaging_weight(self, iteration: u64, delay: u64) -> f64 {
        match self {
            Algorithm::CfrPlus => iteration.saturating_sub(delay) as f64,
            _ => 1.0,
        }
    }

    /// Display name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Cfr => "CFR",
            Algorithm::CfrPlus => "CFR+",
            Algorithm::NormalHedge => "NormalHedge",
            Algorithm::NormalHedgePlus => "NormalHedge+",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cfr" | "vanilla" => Ok(Algorithm::Cfr),
            "cfr+" | "cfr-plus" | "cfrplus" | "cfr_plus" => Ok(Algorithm::CfrPlus),
            "normalhedge" | "normal-hedge" | "normal_hedge" | "nh" => Ok(Algorithm::NormalHedge),
            "normalhedge+" | "normal-hedge-plus" | "normal_hedge_plus" | "normalhedgeplus"
            | "nh+" => Ok(Algorithm::NormalHedgePlus),
            _ => Err(ParseNameError::new("algorithm", s)),
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Simultaneous => f.write_str("simultaneous"),
            Traversal::Alternating => f.write_str("alternating"),
        }
    }
}

impl FromStr for Traversal {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simultaneous" | "sim" => Ok(Traversal::Simultaneous),
            "alternating" | "alt" => Ok(Traversal::Alternating),
            _ => Err(ParseNameError::new("traversal", s)),
        }
    }
}

/// Unknown algorithm or traversal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNameError {
    kind: &'static str,
    name: String,
}

impl ParseNameError {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ParseNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.name)
    }
}

impl std::error::Error for ParseNameError {}
