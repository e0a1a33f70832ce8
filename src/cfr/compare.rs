//! Independent training runs, side by side.
//!
//! Every run owns its trainer and its random source; runs share only the
//! immutable game, so they are spread over the rayon thread pool without any
//! synchronization.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::cfr::algorithm::Algorithm;
use crate::cfr::config::TrainerConfig;
use crate::cfr::game::{Game, GameError};
use crate::cfr::metrics::{tail_mean, ConvergenceSummary};
use crate::cfr::profile::StrategyProfile;
use crate::cfr::trainer::Trainer;

/// Outcome of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Configuration the run used.
    pub config: TrainerConfig,
    /// Engine, repeated for convenient display.
    pub algorithm: Algorithm,
    /// Summary of the per-iteration values.
    pub summary: ConvergenceSummary,
    /// Final average strategy profile.
    pub profile: StrategyProfile,
    /// Exploitability of the final average profile.
    pub exploitability: f64,
    /// Number of information sets discovered.
    pub info_sets: usize,
    /// Wall-clock training time.
    pub elapsed_seconds: f64,
}

/// Train one configuration and summarize it.
pub fn run<G: Game>(
    game: &G,
    config: TrainerConfig,
    iterations: u64,
    reference: Option<f64>,
) -> Result<RunReport, GameError> {
    let start = Instant::now();
    let mut trainer = Trainer::new(game.clone(), config.clone());
    let values = trainer.train(iterations)?;
    let elapsed_seconds = start.elapsed().as_secs_f64();

    Ok(RunReport {
        algorithm: config.algorithm,
        config,
        summary: ConvergenceSummary::from_values(&values, reference),
        profile: trainer.get_strategy_profile(),
        exploitability: trainer.exploitability()?,
        info_sets: trainer.num_info_sets(),
        elapsed_seconds,
    })
}

/// Train every configuration in parallel. Reports keep the input order.
pub fn compare<G: Game>(
    game: &G,
    configs: &[TrainerConfig],
    iterations: u64,
    reference: Option<f64>,
) -> Result<Vec<RunReport>, GameError> {
    configs
        .par_iter()
        .map(|config| run(game, config.clone(), iterations, reference))
        .collect()
}

/// One configuration per engine, with distinct seeds derived from `seed`.
pub fn standard_configs(delay: u64, seed: Option<u64>) -> Vec<TrainerConfig> {
    let configs = [
        TrainerConfig::cfr(),
        TrainerConfig::cfr_plus(delay),
        TrainerConfig::normal_hedge(),
        TrainerConfig::normal_hedge_plus(),
    ];

    configs
        .into_iter()
        .enumerate()
        .map(|(i, config)| match seed {
            Some(seed) => config.with_seed(seed.wrapping_add(i as u64)),
            None => config,
        })
        .collect()
}

/// Estimate player 0's equilibrium value with a CFR run.
///
/// Averages the last `max(2000, iterations / 3)` per-iteration values.
pub fn estimate_equilibrium_value<G: Game>(
    game: &G,
    iterations: u64,
    seed: Option<u64>,
) -> Result<f64, GameError> {
    let config = match seed {
        Some(seed) => TrainerConfig::cfr().with_seed(seed),
        None => TrainerConfig::cfr(),
    };
    let values = Trainer::new(game.clone(), config).train(iterations)?;
    let window = (values.len() / 3).max(2000);
    Ok(tail_mean(&values, window))
}
