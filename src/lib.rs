//! # Kuhn Regret
//!
//! Regret-minimization trainers that compute approximate Nash equilibria
//! for Kuhn Poker by iterated self-play.
//!
//! ## Features
//!
//! - **Generic Trainer**: Works with any game implementing the `Game` trait
//! - **Four Engines**: CFR, CFR+, NormalHedge and NormalHedge+
//! - **Two Traversals**: Simultaneous and alternating updates, selectable by name
//! - **Exact Evaluation**: Best-response exploitability and profile value
//! - **Parallel Comparison**: Independent runs spread over a rayon pool
//!
//! ## Quick Start
//!
//! ```
//! use kuhn_regret::cfr::{Trainer, TrainerConfig};
//! use kuhn_regret::games::kuhn::{KuhnPoker, NASH_VALUE};
//!
//! let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::cfr().with_seed(42));
//! let values = trainer.train(5_000).unwrap();
//!
//! let average = values.iter().sum::<f64>() / values.len() as f64;
//! println!("value {:.4} (equilibrium {:.4})", average, NASH_VALUE);
//! println!("exploitability {:.4}", trainer.exploitability().unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Engines, trainer, evaluation and comparison
//! - [`games`]: Game implementations (Kuhn Poker)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Trainer (Generic)                        │
//! │  - Simultaneous traversal  - Alternating traversal              │
//! │  - Buffered node updates   - Exploitability                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                 │                                 │
//!                 │ per information set             │ implements Game trait
//!                 ▼                                 ▼
//!      ┌────────────────────┐                ┌─────────────┐
//!      │   DecisionPoint    │                │ Kuhn Poker  │
//!      │ CFR / CFR+ / NH /  │                └─────────────┘
//!      │       NH+          │
//!      └────────────────────┘
//! ```

#![warn(missing_docs)]

/// Regret-minimization module.
///
/// This is the core module containing the generic trainer and its engines.
pub mod cfr;

/// Game implementations module.
///
/// Contains Kuhn Poker, the reference game with a known equilibrium.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{Algorithm, Game, StrategyProfile, Trainer, TrainerConfig, Traversal};
