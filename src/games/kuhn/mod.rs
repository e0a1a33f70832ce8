//! Kuhn Poker.
//!
//! Kuhn Poker is the smallest interesting poker game and has a known,
//! closed-form family of Nash equilibria, which makes it the reference game
//! for validating the trainers.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack < Queen < King
//! - 2 players, each antes `ante` chips
//! - Each player receives 1 card, the third card is unused
//! - Player 0 acts first: Check or Bet (`bet_size` chips)
//! - Facing a bet a player may Fold or Call
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P0
//! ├── c (check)
//! │   └── P1
//! │       ├── c → Showdown, ante
//! │       └── b
//! │           └── P0
//! │               ├── f → P1 wins ante
//! │               └── c → Showdown, ante + bet_size
//! └── b (bet)
//!     └── P1
//!         ├── f → P0 wins ante
//!         └── c → Showdown, ante + bet_size
//! ```
//!
//! Call renders as `c` too: it only ever follows a bet, so histories stay
//! unambiguous.
//!
//! ## Known Nash Equilibria (ante = bet_size = 1)
//!
//! For any α in [0, 1/3]:
//!
//! - **P0 with Jack**: Bet α
//! - **P0 with Queen**: Always check; facing check-bet, call α + 1/3
//! - **P0 with King**: Bet 3α; facing check-bet, always call
//! - **P1 after check**: Jack bets 1/3, Queen checks, King bets
//! - **P1 facing bet**: Jack folds, Queen calls 1/3, King calls
//!
//! **Game value**: P0 EV = -1/18 ≈ -0.0556

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cfr::config::ConfigError;
use crate::cfr::game::{Game, GameError, InfoState};
use crate::cfr::profile::StrategyProfile;
use crate::{impl_action, impl_game_state};

/// Player 0's equilibrium value at `ante = bet_size = 1`.
pub const NASH_VALUE: f64 = -1.0 / 18.0;

/// A card rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Lowest card.
    Jack,
    /// Middle card.
    Queen,
    /// Highest card.
    King,
}

impl Card {
    /// The full deck in rank order.
    pub const ALL: [Card; 3] = [Card::Jack, Card::Queen, Card::King];

    /// One-letter symbol used in information-set keys.
    pub fn symbol(self) -> char {
        match self {
            Card::Jack => 'J',
            Card::Queen => 'Q',
            Card::King => 'K',
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KuhnAction {
    /// Pass with no bet pending.
    Check,
    /// Put `bet_size` chips in.
    Bet,
    /// Give up facing a bet.
    Fold,
    /// Match a bet.
    Call,
}

impl KuhnAction {
    /// Canonical history character.
    pub fn symbol(self) -> char {
        match self {
            KuhnAction::Check | KuhnAction::Call => 'c',
            KuhnAction::Bet => 'b',
            KuhnAction::Fold => 'f',
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KuhnAction::Check => "CHECK",
            KuhnAction::Bet => "BET",
            KuhnAction::Fold => "FOLD",
            KuhnAction::Call => "CALL",
        };
        f.write_str(name)
    }
}

impl_action!(KuhnAction);

const OPENING: [KuhnAction; 2] = [KuhnAction::Check, KuhnAction::Bet];
const FACING_BET: [KuhnAction; 2] = [KuhnAction::Fold, KuhnAction::Call];

/// Public action history: at most three actions, filled from the front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct History {
    actions: [Option<KuhnAction>; 3],
}

impl History {
    /// The empty history at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions taken.
    pub fn len(&self) -> usize {
        self.actions.iter().take_while(|a| a.is_some()).count()
    }

    /// Whether no action has been taken.
    pub fn is_empty(&self) -> bool {
        self.actions[0].is_none()
    }

    /// Iterate over the actions taken, in order.
    pub fn actions(&self) -> impl Iterator<Item = KuhnAction> + '_ {
        self.actions.iter().map_while(|a| *a)
    }

    /// Whether the history is one of the five terminal sequences.
    pub fn is_terminal(&self) -> bool {
        use KuhnAction::*;
        matches!(
            self.actions,
            [Some(Check), Some(Check), None]
                | [Some(Bet), Some(Fold | Call), None]
                | [Some(Check), Some(Bet), Some(Fold | Call)]
        )
    }

    /// Legal actions after this history; `None` if it is terminal.
    pub fn legal_actions(&self) -> Option<[KuhnAction; 2]> {
        use KuhnAction::*;
        match self.actions {
            [None, None, None] | [Some(Check), None, None] => Some(OPENING),
            [Some(Bet), None, None] | [Some(Check), Some(Bet), None] => Some(FACING_BET),
            _ => None,
        }
    }

    /// The history extended by `action`, if `action` is legal here.
    pub fn extended(&self, action: KuhnAction) -> Option<History> {
        if !self.legal_actions()?.contains(&action) {
            return None;
        }
        let mut next = *self;
        next.actions[self.len()] = Some(action);
        Some(next)
    }

    /// Whether a bet was matched, so the showdown pot includes `bet_size`.
    fn was_called(&self) -> bool {
        self.actions().any(|a| a == KuhnAction::Call)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in self.actions() {
            write!(f, "{}", action.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for History {
    type Err = GameError;

    /// Parse the canonical form. `c` is a check unless it answers a bet.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut history = History::new();
        for ch in s.chars() {
            let facing_bet = history.legal_actions() == Some(FACING_BET);
            let action = match (ch, facing_bet) {
                ('c', false) => KuhnAction::Check,
                ('c', true) => KuhnAction::Call,
                ('b', _) => KuhnAction::Bet,
                ('f', _) => KuhnAction::Fold,
                _ => return Err(GameError::invalid_state("parse history", s)),
            };
            history = history
                .extended(action)
                .ok_or_else(|| GameError::invalid_state("parse history", s))?;
        }
        Ok(history)
    }
}

/// Stakes of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KuhnConfig {
    /// Forced contribution of each player.
    #[serde(default = "default_amount")]
    pub ante: u32,
    /// Additional contribution on a bet or call.
    #[serde(default = "default_amount")]
    pub bet_size: u32,
}

fn default_amount() -> u32 {
    1
}

impl Default for KuhnConfig {
    fn default() -> Self {
        Self {
            ante: 1,
            bet_size: 1,
        }
    }
}

impl KuhnConfig {
    /// Validated configuration.
    pub fn new(ante: u32, bet_size: u32) -> Result<Self, ConfigError> {
        let config = Self { ante, bet_size };
        config.validate()?;
        Ok(config)
    }

    /// Both amounts must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ante == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ante",
                message: "must be positive".to_string(),
            });
        }
        if self.bet_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bet_size",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// The three cards in a freshly shuffled order.
    pub fn get_deck<R: Rng + ?Sized>(&self, rng: &mut R) -> [Card; 3] {
        let mut deck = Card::ALL;
        deck.shuffle(rng);
        deck
    }
}

/// Complete game state: stakes, both private cards and the public history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KuhnState {
    /// Stakes.
    pub config: KuhnConfig,
    /// `cards[p]` is player `p`'s card.
    pub cards: [Card; 2],
    /// Public history.
    pub history: History,
}

impl KuhnState {
    /// Root state for a deal.
    pub fn new(config: KuhnConfig, cards: [Card; 2]) -> Self {
        Self {
            config,
            cards,
            history: History::new(),
        }
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P0:{} P1:{} History:{}",
            self.cards[0], self.cards[1], self.history
        )
    }
}

impl_game_state!(KuhnState);

/// What a player knows: their own card and the public history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KuhnInfoSet {
    /// The acting player's card.
    pub card: Card,
    /// Public history.
    pub history: History,
}

impl fmt::Display for KuhnInfoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card, self.history)
    }
}

impl InfoState for KuhnInfoSet {}

/// Kuhn Poker game.
#[derive(Debug, Clone, Copy, Default)]
pub struct KuhnPoker {
    config: KuhnConfig,
}

impl KuhnPoker {
    /// Create a game with the given stakes.
    pub fn new(config: KuhnConfig) -> Self {
        Self { config }
    }

    /// Stakes.
    pub fn config(&self) -> &KuhnConfig {
        &self.config
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoSet;

    fn deal<R: Rng>(&self, rng: &mut R) -> Self::State {
        let deck = self.config.get_deck(rng);
        KuhnState::new(self.config, [deck[0], deck[1]])
    }

    fn chance_outcomes(&self) -> Vec<Self::State> {
        let mut deals = Vec::with_capacity(6);
        for first in Card::ALL {
            for second in Card::ALL {
                if first != second {
                    deals.push(KuhnState::new(self.config, [first, second]));
                }
            }
        }
        deals
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.history.is_terminal()
    }

    fn payoff(&self, state: &Self::State, player: usize) -> Result<f64, GameError> {
        use KuhnAction::*;

        let ante = f64::from(state.config.ante);
        let showdown = |stake: f64| {
            if state.cards[0] > state.cards[1] {
                stake
            } else {
                -stake
            }
        };

        let p0_payoff = match state.history.actions {
            [Some(Bet), Some(Fold), None] => ante,
            [Some(Check), Some(Bet), Some(Fold)] => -ante,
            _ if !state.history.is_terminal() => {
                return Err(GameError::invalid_state("payoff", state.history.to_string()));
            }
            _ if state.history.was_called() => {
                showdown(ante + f64::from(state.config.bet_size))
            }
            _ => showdown(ante),
        };

        Ok(if player == 0 { p0_payoff } else { -p0_payoff })
    }

    fn current_player(&self, state: &Self::State) -> usize {
        if state.history.len() == 1 {
            1
        } else {
            0
        }
    }

    fn legal_actions(&self, state: &Self::State) -> Result<Vec<Self::Action>, GameError> {
        state
            .history
            .legal_actions()
            .map(|actions| actions.to_vec())
            .ok_or_else(|| GameError::invalid_state("legal_actions", state.history.to_string()))
    }

    fn apply_action(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, GameError> {
        let history = state
            .history
            .extended(*action)
            .ok_or_else(|| GameError::invalid_state("apply_action", state.history.to_string()))?;
        Ok(KuhnState { history, ..*state })
    }

    fn info_set_key(&self, state: &Self::State, player: usize) -> Self::InfoState {
        KuhnInfoSet {
            card: state.cards[player],
            history: state.history,
        }
    }

    fn info_set_actions(&self, info: &Self::InfoState) -> Vec<Self::Action> {
        info.history
            .legal_actions()
            .map(|actions| actions.to_vec())
            .unwrap_or_default()
    }
}

/// The equilibrium of the α-family described in the module docs.
///
/// `alpha` is clamped to `[0, 1/3]`. Only valid for `ante = bet_size = 1`.
pub fn equilibrium_profile(alpha: f64) -> StrategyProfile {
    let alpha = alpha.clamp(0.0, 1.0 / 3.0);
    let third = 1.0 / 3.0;

    let mut profile = StrategyProfile::new();
    let mut open = |key: &str, bet: f64| {
        profile.insert(key, [("CHECK", 1.0 - bet), ("BET", bet)]);
    };
    open("J", alpha);
    open("Q", 0.0);
    open("K", 3.0 * alpha);
    open("Jc", third);
    open("Qc", 0.0);
    open("Kc", 1.0);

    let mut respond = |key: &str, call: f64| {
        profile.insert(key, [("FOLD", 1.0 - call), ("CALL", call)]);
    };
    respond("Jb", 0.0);
    respond("Qb", third);
    respond("Kb", 1.0);
    respond("Jcb", 0.0);
    respond("Qcb", alpha + third);
    respond("Kcb", 1.0);

    profile
}

/// The α = 1/3 equilibrium used as the distance reference.
pub fn nash_reference() -> StrategyProfile {
    equilibrium_profile(1.0 / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::evaluate::{expected_value, exploitability};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn state(cards: [Card; 2], history: &str) -> KuhnState {
        KuhnState {
            config: KuhnConfig::default(),
            cards,
            history: history.parse().unwrap(),
        }
    }

    #[test]
    fn test_kuhn_game_tree() {
        let game = KuhnPoker::default();

        let root = state([Card::King, Card::Jack], "");
        assert!(!game.is_terminal(&root));
        assert_eq!(game.current_player(&root), 0);
        assert_eq!(
            game.legal_actions(&root).unwrap(),
            vec![KuhnAction::Check, KuhnAction::Bet]
        );

        let checked = game.apply_action(&root, &KuhnAction::Check).unwrap();
        assert_eq!(game.current_player(&checked), 1);
        assert_eq!(
            game.legal_actions(&checked).unwrap(),
            vec![KuhnAction::Check, KuhnAction::Bet]
        );
        // The input state is untouched.
        assert!(root.history.is_empty());

        let check_bet = game.apply_action(&checked, &KuhnAction::Bet).unwrap();
        assert_eq!(game.current_player(&check_bet), 0);
        assert_eq!(
            game.legal_actions(&check_bet).unwrap(),
            vec![KuhnAction::Fold, KuhnAction::Call]
        );

        let bet = game.apply_action(&root, &KuhnAction::Bet).unwrap();
        assert_eq!(game.current_player(&bet), 1);
        assert_eq!(
            game.legal_actions(&bet).unwrap(),
            vec![KuhnAction::Fold, KuhnAction::Call]
        );
    }

    #[test]
    fn test_terminal_histories() {
        let terminal = ["cc", "bf", "bc", "cbf", "cbc"];
        let open = ["", "c", "b", "cb"];
        for h in terminal {
            assert!(h.parse::<History>().unwrap().is_terminal(), "{} should be terminal", h);
        }
        for h in open {
            assert!(!h.parse::<History>().unwrap().is_terminal(), "{} should not be terminal", h);
        }
    }

    #[test]
    fn test_history_rendering() {
        let history: History = "cbc".parse().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history.actions().collect::<Vec<_>>(),
            vec![KuhnAction::Check, KuhnAction::Bet, KuhnAction::Call]
        );
        assert_eq!(history.to_string(), "cbc");

        assert!("x".parse::<History>().is_err());
        assert!("ccc".parse::<History>().is_err());
        assert!("f".parse::<History>().is_err());
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        let game = KuhnPoker::default();

        let cc = state([Card::King, Card::Jack], "cc");
        assert_eq!(game.payoff(&cc, 0).unwrap(), 1.0);
        assert_eq!(game.payoff(&cc, 1).unwrap(), -1.0);

        // Fold forfeits the ante regardless of cards.
        let bf = state([Card::Jack, Card::King], "bf");
        assert_eq!(game.payoff(&bf, 0).unwrap(), 1.0);
        let cbf = state([Card::King, Card::Jack], "cbf");
        assert_eq!(game.payoff(&cbf, 0).unwrap(), -1.0);
        assert_eq!(game.payoff(&cbf, 1).unwrap(), 1.0);

        let bc = state([Card::Jack, Card::King], "bc");
        assert_eq!(game.payoff(&bc, 0).unwrap(), -2.0);
        assert_eq!(game.payoff(&bc, 1).unwrap(), 2.0);
        let cbc = state([Card::Queen, Card::Jack], "cbc");
        assert_eq!(game.payoff(&cbc, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_payoffs_scale_with_stakes() {
        let game = KuhnPoker::new(KuhnConfig::new(2, 3).unwrap());
        let with = |cards, history: &str| KuhnState {
            config: *game.config(),
            cards,
            history: history.parse().unwrap(),
        };

        assert_eq!(game.payoff(&with([Card::Queen, Card::King], "cc"), 0).unwrap(), -2.0);
        assert_eq!(game.payoff(&with([Card::Queen, Card::King], "bf"), 0).unwrap(), 2.0);
        assert_eq!(game.payoff(&with([Card::Queen, Card::King], "cbc"), 1).unwrap(), 5.0);
    }

    #[test]
    fn test_invalid_state_errors() {
        let game = KuhnPoker::default();

        let open = state([Card::King, Card::Jack], "cb");
        assert_eq!(
            game.payoff(&open, 0),
            Err(GameError::invalid_state("payoff", "cb"))
        );

        let done = state([Card::King, Card::Jack], "bc");
        assert!(game.legal_actions(&done).is_err());
        assert!(game.apply_action(&done, &KuhnAction::Check).is_err());

        let root = state([Card::King, Card::Jack], "");
        assert!(game.apply_action(&root, &KuhnAction::Fold).is_err());
    }

    #[test]
    fn test_kuhn_info_sets() {
        let game = KuhnPoker::default();

        let a = state([Card::Queen, Card::King], "c");
        let b = state([Card::Jack, Card::King], "c");
        assert_eq!(game.current_player(&a), 1);

        // Player 1 cannot tell these apart.
        assert_eq!(game.info_set_key(&a, 1), game.info_set_key(&b, 1));
        assert_ne!(game.info_set_key(&a, 0), game.info_set_key(&b, 0));

        let info = game.info_set_key(&state([Card::King, Card::Jack], "cb"), 0);
        assert_eq!(info.to_string(), "Kcb");
        assert_eq!(info.key(), "Kcb");
        assert_eq!(
            game.info_set_actions(&info),
            vec![KuhnAction::Fold, KuhnAction::Call]
        );
    }

    #[test]
    fn test_twelve_decision_info_sets() {
        let game = KuhnPoker::default();
        let mut seen = HashSet::new();
        let mut frontier = game.chance_outcomes();
        assert_eq!(frontier.len(), 6);

        while let Some(s) = frontier.pop() {
            if game.is_terminal(&s) {
                continue;
            }
            seen.insert(game.info_set_key(&s, game.current_player(&s)));
            for action in game.legal_actions(&s).unwrap() {
                frontier.push(game.apply_action(&s, &action).unwrap());
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_deck_and_deal() {
        let config = KuhnConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let mut deck = config.get_deck(&mut rng);
            deck.sort();
            assert_eq!(deck, Card::ALL);
        }

        let game = KuhnPoker::default();
        let dealt = game.deal(&mut rng);
        assert_ne!(dealt.cards[0], dealt.cards[1]);
        assert!(dealt.history.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(KuhnConfig::new(1, 1).is_ok());
        assert!(matches!(
            KuhnConfig::new(0, 1),
            Err(ConfigError::InvalidValue { field: "ante", .. })
        ));
        assert!(matches!(
            KuhnConfig::new(1, 0),
            Err(ConfigError::InvalidValue { field: "bet_size", .. })
        ));
    }

    #[test]
    fn test_equilibrium_family() {
        let game = KuhnPoker::default();

        for alpha in [0.0, 1.0 / 6.0, 1.0 / 3.0] {
            let profile = equilibrium_profile(alpha);
            assert_eq!(profile.len(), 12);

            let policy = |info: &KuhnInfoSet, _: usize| profile.distribution(&game, info);
            let value = expected_value(&game, &policy).unwrap();
            let exploit = exploitability(&game, &policy).unwrap();
            println!("alpha={:.3}: value={:.6}, exploitability={:.2e}", alpha, value, exploit);

            assert!((value - NASH_VALUE).abs() < 1e-9, "value {} at alpha {}", value, alpha);
            assert!(exploit.abs() < 1e-9, "exploitability {} at alpha {}", exploit, alpha);
        }
    }

    #[test]
    fn test_uniform_play_is_exploitable() {
        let game = KuhnPoker::default();
        let uniform = |_: &KuhnInfoSet, n: usize| vec![1.0 / n as f64; n];
        assert!(exploitability(&game, &uniform).unwrap() > 0.1);
    }
}
