//! Full-tree regret-minimization trainer.
//!
//! Each iteration deals one card assignment and walks every path of the game
//! tree from it. Two traversal disciplines are supported:
//!
//! - **Simultaneous** (CFR, NormalHedge): both players' regrets and strategy
//!   sums are updated in the same pass; utilities travel in player 0's frame.
//! - **Alternating** (CFR+, NormalHedge+): one player updates regrets while
//!   the other accumulates its average strategy, switching every iteration.
//!
//! Node updates produced by a traversal are buffered and only applied once
//! the whole traversal has succeeded, so a failing iteration leaves the
//! statistics untouched.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfr::algorithm::Traversal;
use crate::cfr::config::{TrainerConfig, TrainingStats};
use crate::cfr::evaluate;
use crate::cfr::game::{Game, GameError, InfoState};
use crate::cfr::node::uniform;
use crate::cfr::profile::StrategyProfile;
use crate::cfr::storage::InfoSetTable;

/// How often `train` logs progress.
const LOG_INTERVAL: u64 = 1000;

/// Update for one information set, applied after the traversal completes.
#[derive(Debug)]
struct NodeUpdate<K> {
    key: K,
    num_actions: usize,
    /// Instantaneous regret per action; empty on a strategy-only pass.
    regrets: Vec<f64>,
    /// Weight for the cached strategy; zero skips accumulation.
    strategy_weight: f64,
}

/// The regret-minimization trainer.
///
/// # Type Parameters
/// - `G`: The game type implementing the `Game` trait
///
/// # Example
/// ```
/// use kuhn_regret::cfr::{Trainer, TrainerConfig};
/// use kuhn_regret::games::kuhn::KuhnPoker;
///
/// let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::cfr().with_seed(1));
/// let values = trainer.train(100).unwrap();
/// assert_eq!(values.len(), 100);
/// assert_eq!(trainer.num_info_sets(), 12);
/// ```
pub struct Trainer<G: Game> {
    /// The game being trained.
    game: G,

    /// Engine, traversal, delay and seed.
    config: TrainerConfig,

    /// Information set -> statistics.
    table: InfoSetTable<G::InfoState>,

    /// Updates recorded by the traversal in progress.
    pending: Vec<NodeUpdate<G::InfoState>>,

    /// Completed iterations, cumulative across `train` calls.
    iteration: u64,

    /// Statistics tracking.
    stats: TrainingStats,

    /// Random number generator for dealing.
    rng: StdRng,
}

impl<G: Game> Trainer<G> {
    /// Create an empty trainer.
    pub fn new(game: G, config: TrainerConfig) -> Self {
        let rng = seeded_rng(config.seed);
        let table = InfoSetTable::new(config.algorithm);

        Self {
            game,
            config,
            table,
            pending: Vec::new(),
            iteration: 0,
            stats: TrainingStats::new(),
            rng,
        }
    }

    /// Run one iteration and return player 0's value for it.
    ///
    /// # Errors
    /// Any `GameError` raised by the game model. The statistics and the
    /// iteration counter are then left as they were before the call.
    pub fn run_iteration(&mut self) -> Result<f64, GameError> {
        let iteration = self.iteration + 1;
        let root = self.game.deal(&mut self.rng);
        self.pending.clear();

        let result = match self.config.traversal() {
            Traversal::Simultaneous => self.traverse_simultaneous(&root, [1.0, 1.0]),
            Traversal::Alternating => {
                let updating = updating_player(iteration);
                let weight = self
                    .config
                    .algorithm
                    .averaging_weight(iteration, self.config.delay);
                self.traverse_alternating(&root, updating, weight, [1.0, 1.0])
                    .map(|value| if updating == 0 { value } else { -value })
            }
        };

        match result {
            Ok(value) => {
                self.commit();
                self.iteration = iteration;
                Ok(value)
            }
            Err(e) => {
                self.pending.clear();
                Err(e)
            }
        }
    }

    /// Train for `iterations` iterations.
    ///
    /// # Returns
    /// Player 0's value for every iteration, in order.
    pub fn train(&mut self, iterations: u64) -> Result<Vec<f64>, GameError> {
        self.train_with_callback(iterations, 0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `callback_interval` - How often to call the callback (0 disables it)
    /// * `callback` - Function called every `callback_interval` iterations
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<Vec<f64>, GameError>
    where
        F: FnMut(&TrainingStats),
    {
        let start_time = Instant::now();
        let mut values = Vec::with_capacity(iterations as usize);

        for i in 0..iterations {
            let value = self.run_iteration()?;
            values.push(value);

            if self.iteration % LOG_INTERVAL == 0 {
                log::debug!(
                    "{} iteration {}: value {:+.4}, {} info sets",
                    self.config.algorithm,
                    self.iteration,
                    value,
                    self.table.num_info_sets()
                );
            }

            if callback_interval > 0 && (i + 1) % callback_interval == 0 {
                self.refresh_stats(start_time);
                callback(&self.stats);
            }
        }

        self.refresh_stats(start_time);
        log::info!(
            "{} trained {} iterations ({} total) in {:.2}s, {} info sets",
            self.config.algorithm,
            iterations,
            self.iteration,
            self.stats.elapsed_seconds,
            self.stats.info_sets
        );

        Ok(values)
    }

    fn refresh_stats(&mut self, start_time: Instant) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.table.num_info_sets();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.update_rate();
    }

    /// Simultaneous traversal. Returns player 0's utility.
    fn traverse_simultaneous(
        &mut self,
        state: &G::State,
        reach: [f64; 2],
    ) -> Result<f64, GameError> {
        if self.game.is_terminal(state) {
            return self.game.payoff(state, 0);
        }

        let player = self.game.current_player(state);
        let actions = self.game.legal_actions(state)?;
        let info = self.game.info_set_key(state, player);
        let strategy = self.strategy_at(&info, actions.len());

        // Utilities in the acting player's frame.
        let mut utilities = Vec::with_capacity(actions.len());
        for (action, &p) in actions.iter().zip(strategy.iter()) {
            let child = self.game.apply_action(state, action)?;
            let mut child_reach = reach;
            child_reach[player] *= p;
            let value = self.traverse_simultaneous(&child, child_reach)?;
            utilities.push(if player == 0 { value } else { -value });
        }

        let expected = dot(&strategy, &utilities);
        let opponent_reach = reach[1 - player];

        self.pending.push(NodeUpdate {
            key: info,
            num_actions: actions.len(),
            regrets: utilities
                .iter()
                .map(|u| opponent_reach * (u - expected))
                .collect(),
            strategy_weight: reach[player],
        });

        Ok(if player == 0 { expected } else { -expected })
    }

    /// Alternating traversal. Returns the updating player's utility.
    fn traverse_alternating(
        &mut self,
        state: &G::State,
        updating: usize,
        weight: f64,
        reach: [f64; 2],
    ) -> Result<f64, GameError> {
        if self.game.is_terminal(state) {
            return self.game.payoff(state, updating);
        }

        let player = self.game.current_player(state);
        let actions = self.game.legal_actions(state)?;
        let info = self.game.info_set_key(state, player);
        let strategy = self.strategy_at(&info, actions.len());

        let mut utilities = Vec::with_capacity(actions.len());
        for (action, &p) in actions.iter().zip(strategy.iter()) {
            let child = self.game.apply_action(state, action)?;
            let mut child_reach = reach;
            child_reach[player] *= p;
            utilities.push(self.traverse_alternating(&child, updating, weight, child_reach)?);
        }

        let expected = dot(&strategy, &utilities);

        let update = if player == updating {
            let opponent_reach = reach[1 - player];
            NodeUpdate {
                key: info,
                num_actions: actions.len(),
                regrets: utilities
                    .iter()
                    .map(|u| opponent_reach * (u - expected))
                    .collect(),
                strategy_weight: 0.0,
            }
        } else {
            NodeUpdate {
                key: info,
                num_actions: actions.len(),
                regrets: Vec::new(),
                strategy_weight: weight * reach[player],
            }
        };
        self.pending.push(update);

        Ok(expected)
    }

    /// Current strategy at `info` without creating its node.
    fn strategy_at(&mut self, info: &G::InfoState, num_actions: usize) -> Vec<f64> {
        match self.table.get_mut(info) {
            Some(node) => node.current_strategy().to_vec(),
            None => uniform(num_actions),
        }
    }

    /// Apply the buffered updates of a completed traversal.
    ///
    /// Strategy mass goes in before regret so it uses the strategy the
    /// traversal actually played.
    fn commit(&mut self) {
        for update in self.pending.drain(..) {
            let node = self.table.get_or_insert(&update.key, update.num_actions);
            if update.strategy_weight > 0.0 {
                node.accumulate_strategy_mass(update.strategy_weight);
            }
            for (action, &delta) in update.regrets.iter().enumerate() {
                node.accumulate_regret(action, delta);
            }
        }
    }

    /// Export the average strategy of every discovered information set.
    pub fn get_strategy_profile(&self) -> StrategyProfile {
        let mut profile = StrategyProfile::new();
        for (info, node) in self.table.iter() {
            let names = self
                .game
                .info_set_actions(info)
                .iter()
                .map(|action| self.game.action_name(action))
                .collect::<Vec<_>>();
            profile.insert(info.key(), names.into_iter().zip(node.average_strategy()));
        }
        profile
    }

    /// Average strategy at `info`; uniform if it was never visited.
    pub fn average_strategy(&self, info: &G::InfoState) -> Vec<f64> {
        let num_actions = self.game.info_set_actions(info).len();
        self.table.average_strategy(info, num_actions)
    }

    /// Strategy cached at `info` by the last visit; uniform if never visited.
    pub fn current_strategy(&self, info: &G::InfoState) -> Vec<f64> {
        let num_actions = self.game.info_set_actions(info).len();
        self.table.current_strategy(info, num_actions)
    }

    /// Sample one of `actions` from the average strategy at `info`.
    ///
    /// Unvisited information sets are sampled uniformly. Returns `None` only
    /// if `actions` is empty.
    pub fn sample_action<R: Rng>(
        &self,
        info: &G::InfoState,
        actions: &[G::Action],
        rng: &mut R,
    ) -> Option<G::Action> {
        if actions.is_empty() {
            return None;
        }
        let index = self.table.sample_average(info, actions.len(), rng);
        actions.get(index).copied()
    }

    /// Player 0's exact value when both players follow the average strategy.
    pub fn expected_value(&self) -> Result<f64, GameError> {
        evaluate::expected_value(&self.game, &|info, n| self.table.average_strategy(info, n))
    }

    /// Value `player` gets by best-responding to the opponent's average strategy.
    pub fn best_response_value(&self, player: usize) -> Result<f64, GameError> {
        evaluate::best_response_value(&self.game, player, &|info, n| {
            self.table.average_strategy(info, n)
        })
    }

    /// Exploitability of the average strategy profile (chips per hand).
    ///
    /// Zero exactly at a Nash equilibrium.
    pub fn exploitability(&self) -> Result<f64, GameError> {
        evaluate::exploitability(&self.game, &|info, n| self.table.average_strategy(info, n))
    }

    /// Compute the exploitability and record it in the stats history.
    pub fn record_exploitability(&mut self) -> Result<f64, GameError> {
        let exploitability = self.exploitability()?;
        self.stats.record_exploitability(self.iteration, exploitability);
        log::debug!(
            "{} iteration {}: exploitability {:.6}",
            self.config.algorithm,
            self.iteration,
            exploitability
        );
        Ok(exploitability)
    }

    /// Completed iterations.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Number of discovered information sets.
    pub fn num_info_sets(&self) -> usize {
        self.table.num_info_sets()
    }

    /// Direct read access to the information-set table.
    pub fn info_sets(&self) -> &InfoSetTable<G::InfoState> {
        &self.table
    }

    /// Training statistics.
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// The game being trained.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Forget everything learned and reseed the random source.
    pub fn reset(&mut self) {
        self.table.clear();
        self.pending.clear();
        self.iteration = 0;
        self.stats = TrainingStats::new();
        self.rng = seeded_rng(self.config.seed);
    }
}

impl<G: Game> Clone for Trainer<G> {
    fn clone(&self) -> Self {
        Self {
            game: self.game.clone(),
            config: self.config.clone(),
            table: self.table.clone(),
            pending: Vec::new(),
            iteration: self.iteration,
            stats: self.stats.clone(),
            rng: self.rng.clone(),
        }
    }
}

/// Player who updates regrets on 1-indexed `iteration`: 0 on odd, 1 on even.
pub fn updating_player(iteration: u64) -> usize {
    if iteration % 2 == 1 {
        0
    } else {
        1
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::algorithm::Algorithm;
    use crate::games::kuhn::{Card, KuhnAction, KuhnConfig, KuhnInfoSet, KuhnPoker, KuhnState};

    fn trainer(config: TrainerConfig) -> Trainer<KuhnPoker> {
        Trainer::new(KuhnPoker::default(), config)
    }

    fn info(key: &str) -> KuhnInfoSet {
        let card = match &key[..1] {
            "J" => Card::Jack,
            "Q" => Card::Queen,
            _ => Card::King,
        };
        KuhnInfoSet {
            card,
            history: key[1..].parse().unwrap(),
        }
    }

    #[test]
    fn test_updating_player_alternates() {
        assert_eq!(updating_player(1), 0);
        assert_eq!(updating_player(2), 1);
        assert_eq!(updating_player(3), 0);
    }

    #[test]
    fn test_train_returns_one_value_per_iteration() {
        for algorithm in Algorithm::ALL {
            let mut t = trainer(TrainerConfig::new(algorithm).with_seed(5));
            let values = t.train(250).unwrap();
            assert_eq!(values.len(), 250);
            assert_eq!(t.iteration(), 250);
            assert_eq!(t.stats().iterations, 250);
            assert!(values.iter().all(|v| v.is_finite() && v.abs() <= 2.0));
        }
    }

    /// Value of `state` for `player` when everyone plays the current strategy.
    fn current_value(t: &mut Trainer<KuhnPoker>, state: &KuhnState, player: usize) -> f64 {
        let game = t.game().clone();
        if game.is_terminal(state) {
            return game.payoff(state, player).unwrap();
        }
        let actor = game.current_player(state);
        let actions = game.legal_actions(state).unwrap();
        let strategy = t.strategy_at(&game.info_set_key(state, actor), actions.len());
        actions
            .iter()
            .zip(strategy.iter())
            .map(|(action, &p)| {
                let child = game.apply_action(state, action).unwrap();
                p * current_value(t, &child, player)
            })
            .sum()
    }

    #[test]
    fn test_alternating_value_is_in_player_zero_frame() {
        for config in [TrainerConfig::cfr_plus(0), TrainerConfig::normal_hedge_plus()] {
            let mut t = trainer(config.with_seed(31));
            for _ in 0..20 {
                let updating = updating_player(t.iteration() + 1);
                let mut lookahead = t.clone();
                let root = lookahead.game.deal(&mut lookahead.rng);
                let root_utility = current_value(&mut lookahead, &root, updating);

                let value = t.run_iteration().unwrap();
                let expected = if updating == 0 { root_utility } else { -root_utility };
                assert!(
                    (value - expected).abs() < 1e-12,
                    "iteration {}: returned {}, updating player {} had {}",
                    t.iteration(),
                    value,
                    updating,
                    root_utility
                );
            }
        }
    }

    #[test]
    fn test_iteration_counter_is_cumulative() {
        let mut split = trainer(TrainerConfig::cfr_plus(3).with_seed(11));
        let mut first = split.train(7).unwrap();
        first.extend(split.train(13).unwrap());

        let mut whole = trainer(TrainerConfig::cfr_plus(3).with_seed(11));
        assert_eq!(whole.train(20).unwrap(), first);
        assert_eq!(split.iteration(), 20);
    }

    #[test]
    fn test_deterministic_with_seed() {
        for algorithm in Algorithm::ALL {
            let config = TrainerConfig::new(algorithm).with_seed(42);
            let a = trainer(config.clone()).train(500).unwrap();
            let b = trainer(config).train(500).unwrap();
            assert_eq!(a, b, "{} is not reproducible", algorithm);
        }
    }

    #[test]
    fn test_discovers_twelve_info_sets() {
        for algorithm in Algorithm::ALL {
            let mut t = trainer(TrainerConfig::new(algorithm).with_seed(3));
            t.train(100).unwrap();
            assert_eq!(t.num_info_sets(), 12, "{}", algorithm);
            assert_eq!(t.get_strategy_profile().len(), 12);
        }
    }

    #[test]
    fn test_floored_regret_after_training() {
        for config in [TrainerConfig::cfr_plus(0), TrainerConfig::normal_hedge_plus()] {
            let mut t = trainer(config.with_seed(8));
            t.train(300).unwrap();
            for (key, node) in t.info_sets().iter() {
                assert!(
                    node.regret_sum().iter().all(|&r| r >= 0.0),
                    "negative regret at {}: {:?}",
                    key,
                    node.regret_sum()
                );
            }
        }
    }

    #[test]
    fn test_strategies_are_distributions() {
        for algorithm in Algorithm::ALL {
            let mut t = trainer(TrainerConfig::new(algorithm).with_seed(21));
            t.train(200).unwrap();
            for (key, _) in t.info_sets().iter() {
                for strategy in [t.average_strategy(key), t.current_strategy(key)] {
                    assert_eq!(strategy.len(), 2);
                    assert!(strategy.iter().all(|&p| p >= 0.0));
                    assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_delay_holds_back_averaging() {
        let mut t = trainer(TrainerConfig::cfr_plus(10).with_seed(4));
        t.train(10).unwrap();
        // Weights max(t - 10, 0) are all zero so far.
        assert!(t
            .info_sets()
            .iter()
            .all(|(_, node)| node.strategy_sum().iter().all(|&s| s == 0.0)));

        t.train(2).unwrap();
        assert!(t
            .info_sets()
            .iter()
            .any(|(_, node)| node.strategy_sum().iter().any(|&s| s > 0.0)));
    }

    #[test]
    fn test_profile_action_names() {
        let mut t = trainer(TrainerConfig::cfr().with_seed(2));
        t.train(50).unwrap();
        let profile = t.get_strategy_profile();

        let root = profile.get("K").unwrap();
        assert!(root.contains_key("CHECK") && root.contains_key("BET"));
        let facing = profile.get("Qcb").unwrap();
        assert!(facing.contains_key("FOLD") && facing.contains_key("CALL"));
    }

    #[test]
    fn test_sample_action() {
        let mut t = trainer(TrainerConfig::cfr().with_seed(2));
        let mut rng = StdRng::seed_from_u64(0);
        let actions = [KuhnAction::Check, KuhnAction::Bet];

        // Unvisited: uniform fallback still returns a legal action.
        let drawn = t.sample_action(&info("K"), &actions, &mut rng).unwrap();
        assert!(actions.contains(&drawn));
        assert_eq!(t.sample_action(&info("K"), &[], &mut rng), None);

        t.train(2000).unwrap();
        let bets = (0..200)
            .filter(|_| t.sample_action(&info("Kb"), &[KuhnAction::Fold, KuhnAction::Call], &mut rng)
                == Some(KuhnAction::Call))
            .count();
        assert!(bets > 180, "king should call a bet, called {} / 200", bets);
    }

    #[test]
    fn test_exploitability_decreases_and_is_recorded() {
        let mut t = trainer(TrainerConfig::cfr().with_seed(6));
        let untrained = t.exploitability().unwrap();
        t.train(2000).unwrap();
        let trained = t.record_exploitability().unwrap();

        assert!(trained >= -1e-12);
        assert!(trained < untrained, "{} should be below {}", trained, untrained);
        assert_eq!(t.stats().exploitability, Some(trained));
        assert_eq!(t.stats().exploitability_history[0].iteration, 2000);

        let br0 = t.best_response_value(0).unwrap();
        let br1 = t.best_response_value(1).unwrap();
        let value = t.expected_value().unwrap();
        // Best responses can only improve on the profile's own value.
        assert!(br0 >= value - 1e-12);
        assert!(br1 >= -value - 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut t = trainer(TrainerConfig::normal_hedge().with_seed(13));
        let first = t.train(40).unwrap();
        t.reset();
        assert_eq!(t.iteration(), 0);
        assert_eq!(t.num_info_sets(), 0);
        assert_eq!(t.train(40).unwrap(), first);
    }

    /// Kuhn with a payoff fault on one deal, to exercise rollback.
    #[derive(Clone)]
    struct Faulty {
        inner: KuhnPoker,
        broken: Card,
    }

    impl Game for Faulty {
        type State = KuhnState;
        type Action = KuhnAction;
        type InfoState = KuhnInfoSet;

        fn deal<R: Rng>(&self, rng: &mut R) -> KuhnState {
            self.inner.deal(rng)
        }
        fn chance_outcomes(&self) -> Vec<KuhnState> {
            self.inner.chance_outcomes()
        }
        fn is_terminal(&self, state: &KuhnState) -> bool {
            self.inner.is_terminal(state)
        }
        fn payoff(&self, state: &KuhnState, player: usize) -> Result<f64, GameError> {
            if state.cards[0] == self.broken && state.history.to_string() == "cbc" {
                return Err(GameError::invalid_state("payoff", "cbc"));
            }
            self.inner.payoff(state, player)
        }
        fn current_player(&self, state: &KuhnState) -> usize {
            self.inner.current_player(state)
        }
        fn legal_actions(&self, state: &KuhnState) -> Result<Vec<KuhnAction>, GameError> {
            self.inner.legal_actions(state)
        }
        fn apply_action(&self, state: &KuhnState, action: &KuhnAction) -> Result<KuhnState, GameError> {
            self.inner.apply_action(state, action)
        }
        fn info_set_key(&self, state: &KuhnState, player: usize) -> KuhnInfoSet {
            self.inner.info_set_key(state, player)
        }
        fn info_set_actions(&self, info: &KuhnInfoSet) -> Vec<KuhnAction> {
            self.inner.info_set_actions(info)
        }
    }

    fn snapshot(t: &Trainer<Faulty>) -> Vec<(String, Vec<f64>, Vec<f64>)> {
        let mut rows: Vec<_> = t
            .info_sets()
            .iter()
            .map(|(k, n)| (k.to_string(), n.regret_sum().to_vec(), n.strategy_sum().to_vec()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    #[test]
    fn test_failed_iteration_leaves_no_trace() {
        let game = Faulty {
            inner: KuhnPoker::new(KuhnConfig::default()),
            broken: Card::King,
        };
        let mut t = Trainer::new(game, TrainerConfig::cfr().with_seed(17));

        let mut failures = 0;
        for _ in 0..60 {
            let before = snapshot(&t);
            let iteration = t.iteration();
            match t.run_iteration() {
                Ok(_) => assert_eq!(t.iteration(), iteration + 1),
                Err(e) => {
                    failures += 1;
                    assert_eq!(e, GameError::invalid_state("payoff", "cbc"));
                    assert_eq!(t.iteration(), iteration);
                    assert_eq!(snapshot(&t), before);
                }
            }
        }
        // Player 0 holds the king on a third of the deals.
        assert!(failures > 5 && failures < 55, "{} failures", failures);
        assert!(t.train(100).is_err());
    }
}
