//! Game implementations for the trainer.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker - a 3-card poker game with a known Nash equilibrium
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and information-set types
//! 3. Implement the `Game` trait, including `chance_outcomes` so the exact
//!    evaluators can enumerate deals
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod kuhn;
