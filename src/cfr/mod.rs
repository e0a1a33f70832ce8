//! Regret-minimization training module.
//!
//! This module provides a generic, full-tree implementation of four
//! regret minimizers for two-player zero-sum extensive-form games.
//!
//! # Supported Engines
//!
//! - **CFR**: regret matching on signed cumulative regret, simultaneous traversal
//! - **CFR+**: regret floored at zero, alternating traversal, delayed linear averaging
//! - **NormalHedge**: half-normal potential over positive regret, simultaneous traversal
//! - **NormalHedge+**: NormalHedge potential with floored regret, alternating traversal
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `Trainer` with your game and a `TrainerConfig`
//! 3. Call `train()`, which returns player 0's value for every iteration
//! 4. Export the average strategy with `get_strategy_profile()`
//!
//! # Example
//!
//! ```
//! use kuhn_regret::cfr::{Trainer, TrainerConfig};
//! use kuhn_regret::games::kuhn::KuhnPoker;
//!
//! let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::normal_hedge_plus().with_seed(3));
//! let values = trainer.train(1_000).unwrap();
//! let profile = trainer.get_strategy_profile();
//!
//! assert_eq!(values.len(), 1_000);
//! assert!(profile.probability("Kb", "CALL").unwrap() > 0.9);
//! ```
//!
//! # Theory
//!
//! **Regret**: how much better a fixed action would have done than the
//! current strategy, weighted by the opponent's reach probability.
//! ```text
//! r(a) = π_opp · (u(a) - Σ σ(b) u(b))
//! ```
//!
//! **Regret Matching**: strategy proportional to positive cumulative regret.
//! ```text
//! σ(a) = max(0, R(a)) / Σ max(0, R(b))
//! ```
//!
//! **NormalHedge**: weight each action by the derivative of a half-normal
//! potential, with the scale `c` calibrated so the mean potential equals `e`.
//! ```text
//! w(a) = (R⁺(a) / c) · exp(R⁺(a)² / 2c)      mean_a exp(R⁺(a)² / 2c) = e
//! ```
//!
//! The time-averaged strategy, not the last iterate, approaches equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)
//! - Chaudhuri, K., Freund, Y., Hsu, D. "A Parameter-free Hedging Algorithm" (2009)

pub mod algorithm;
pub mod compare;
pub mod config;
pub mod evaluate;
pub mod game;
pub mod hedge;
pub mod metrics;
pub mod node;
pub mod profile;
pub mod storage;
pub mod trainer;

// Re-export main types for convenient access
pub use algorithm::{Algorithm, ParseNameError, Traversal};
pub use compare::{compare, estimate_equilibrium_value, standard_configs, RunReport};
pub use config::{ConfigError, ExploitabilityPoint, TrainerConfig, TrainingStats};
pub use game::{Action, Game, GameError, GameState, InfoState};
pub use metrics::ConvergenceSummary;
pub use node::DecisionPoint;
pub use profile::StrategyProfile;
pub use storage::InfoSetTable;
pub use trainer::Trainer;
