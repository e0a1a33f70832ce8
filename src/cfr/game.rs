//! Game trait definition for the regret-minimization trainers.
//!
//! Any two-player zero-sum game that implements the `Game` trait can be
//! trained with the `Trainer`. The trait keeps the algorithm independent of
//! how a particular game encodes cards, histories and payoffs.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use rand::Rng;

/// Trait for actions that can be taken in a game.
///
/// Actions are small values: copyable, comparable and hashable.
pub trait Action: Copy + Eq + Hash + Debug + Display + Send + Sync {}

/// Trait for information sets (what a player knows at a decision point).
///
/// Two game states that look identical to the acting player (same private
/// card, same public history) must produce equal information sets. The
/// `Display` form is only used at the export boundary.
pub trait InfoState: Clone + Eq + Hash + Debug + Display + Send + Sync {
    /// Human-readable key for export and lookup by collaborators.
    fn key(&self) -> String {
        self.to_string()
    }
}

/// Trait for game states.
///
/// A game state contains all information about the current state of the game,
/// including private information that players may not see.
pub trait GameState: Clone + Debug + Send + Sync {}

/// Errors raised by a game model when asked something its state cannot answer.
///
/// These are programmer errors: the trainer never catches them, it hands them
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The request does not match the terminality of the state
    /// (payoff on a non-terminal state, actions on a terminal one).
    InvalidState {
        /// The operation that was requested.
        operation: &'static str,
        /// Display form of the offending history.
        history: String,
    },
}

impl GameError {
    /// Build an `InvalidState` error for `operation` at `history`.
    pub fn invalid_state(operation: &'static str, history: impl Into<String>) -> Self {
        GameError::InvalidState {
            operation,
            history: history.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidState { operation, history } => {
                write!(f, "invalid state for {}: history '{}'", operation, history)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// The main Game trait that defines the interface for a two-player game.
///
/// # Type Parameters
/// - `State`: The full game state, including hidden cards
/// - `Action`: The action type
/// - `InfoState`: The information-set identity used to index statistics
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoSet;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// Resolve the chance node: deal private cards and return the root state.
    fn deal<R: Rng>(&self, rng: &mut R) -> Self::State;

    /// Every root state the chance node can produce, all equally likely.
    ///
    /// Used by exact evaluators such as best-response exploitability.
    fn chance_outcomes(&self) -> Vec<Self::State>;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Get the payoff for a player at a terminal state.
    ///
    /// # Errors
    /// `GameError::InvalidState` if the state is not terminal.
    fn payoff(&self, state: &Self::State, player: usize) -> Result<f64, GameError>;

    /// Index of the player to act at a non-terminal state.
    fn current_player(&self, state: &Self::State) -> usize;

    /// Ordered legal actions at a non-terminal state.
    ///
    /// # Errors
    /// `GameError::InvalidState` if the state is terminal.
    fn legal_actions(&self, state: &Self::State) -> Result<Vec<Self::Action>, GameError>;

    /// Apply an action and return the resulting state.
    ///
    /// This never modifies the input state.
    ///
    /// # Errors
    /// `GameError::InvalidState` if the state is terminal or the action is
    /// not legal there.
    fn apply_action(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, GameError>;

    /// The information set of `player` at `state`.
    fn info_set_key(&self, state: &Self::State, player: usize) -> Self::InfoState;

    /// Legal actions at an information set, derived from its public history.
    fn info_set_actions(&self, info: &Self::InfoState) -> Vec<Self::Action>;

    /// Get a human-readable name for an action.
    ///
    /// Used for strategy export.
    fn action_name(&self, action: &Self::Action) -> String {
        action.to_string()
    }
}

/// Macro to simplify implementing the Action trait.
#[macro_export]
macro_rules! impl_action {
    ($type:ty) => {
        impl $crate::cfr::game::Action for $type {}
    };
}

/// Macro to simplify implementing the GameState trait.
#[macro_export]
macro_rules! impl_game_state {
    ($type:ty) => {
        impl $crate::cfr::game::GameState for $type {}
    };
}
