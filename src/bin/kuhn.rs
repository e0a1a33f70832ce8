//! Kuhn Poker trainer CLI.
//!
//! Usage:
//!   kuhn train --algorithm cfr+ --iterations 20000 --delay 100 --output result.json
//!   kuhn train --algorithm nh --profile profile.json
//!   kuhn compare --iterations 20000 --seed 7
//!   kuhn estimate --iterations 100000 --ante 1 --bet-size 2

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use kuhn_regret::cfr::metrics::{tail_mean, ConvergenceSummary};
use kuhn_regret::cfr::{
    compare, estimate_equilibrium_value, standard_configs, Algorithm, StrategyProfile, Trainer,
    TrainerConfig, Traversal,
};
use kuhn_regret::games::kuhn::{nash_reference, KuhnConfig, KuhnPoker, NASH_VALUE};

/// Values averaged for `final_expected_value`.
const FINAL_VALUE_WINDOW: usize = 1000;

#[derive(Parser)]
#[command(name = "kuhn")]
#[command(about = "Regret-minimization trainers for Kuhn poker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train one engine and print its average strategy
    Train {
        /// Engine: cfr, cfr+, normalhedge (nh) or normalhedge+ (nh+)
        #[arg(short, long)]
        algorithm: Option<Algorithm>,
        /// Number of iterations
        #[arg(short, long, default_value_t = 20_000)]
        iterations: u64,
        /// Ante per player
        #[arg(long, default_value_t = 1)]
        ante: u32,
        /// Bet size
        #[arg(long, default_value_t = 1)]
        bet_size: u32,
        /// CFR+ averaging delay
        #[arg(short, long)]
        delay: Option<u64>,
        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Traversal override: simultaneous or alternating
        #[arg(short, long)]
        traversal: Option<Traversal>,
        /// Trainer config JSON; flags given on the command line take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write only the average strategy profile as JSON
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Train all four engines in parallel and compare them
    Compare {
        /// Number of iterations per engine
        #[arg(short, long, default_value_t = 20_000)]
        iterations: u64,
        /// Ante per player
        #[arg(long, default_value_t = 1)]
        ante: u32,
        /// Bet size
        #[arg(long, default_value_t = 1)]
        bet_size: u32,
        /// CFR+ averaging delay
        #[arg(short, long, default_value_t = 0)]
        delay: u64,
        /// Base random seed; engine `i` uses `seed + i`
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write the reports as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Estimate the equilibrium value of a configuration with CFR
    Estimate {
        /// Number of iterations
        #[arg(short, long, default_value_t = 100_000)]
        iterations: u64,
        /// Ante per player
        #[arg(long, default_value_t = 1)]
        ante: u32,
        /// Bet size
        #[arg(long, default_value_t = 1)]
        bet_size: u32,
        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

/// JSON result of `kuhn train`.
#[derive(Serialize)]
struct TrainOutput {
    config: KuhnConfig,
    trainer: TrainerConfig,
    algorithm: String,
    strategy_profile: StrategyProfile,
    final_expected_value: f64,
    num_iterations: u64,
    exploitability: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Train {
            algorithm,
            iterations,
            ante,
            bet_size,
            delay,
            seed,
            traversal,
            config,
            output,
            profile,
        } => {
            let mut trainer_config = match config {
                Some(path) => TrainerConfig::from_json_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => TrainerConfig::default(),
            };
            if let Some(algorithm) = algorithm {
                trainer_config.algorithm = algorithm;
            }
            if let Some(delay) = delay {
                trainer_config.delay = delay;
            }
            if let Some(traversal) = traversal {
                trainer_config.traversal = Some(traversal);
            }
            if let Some(seed) = seed {
                trainer_config.seed = Some(seed);
            }
            trainer_config.validate()?;

            let game_config = KuhnConfig::new(ante, bet_size)?;
            train(
                game_config,
                trainer_config,
                iterations,
                output.as_deref(),
                profile.as_deref(),
            )
        }
        Commands::Compare {
            iterations,
            ante,
            bet_size,
            delay,
            seed,
            output,
        } => {
            let game_config = KuhnConfig::new(ante, bet_size)?;
            run_comparison(game_config, iterations, delay, seed, output.as_deref())
        }
        Commands::Estimate {
            iterations,
            ante,
            bet_size,
            seed,
        } => {
            let game_config = KuhnConfig::new(ante, bet_size)?;
            let game = KuhnPoker::new(game_config);

            log::info!("estimating equilibrium value with {} CFR iterations", iterations);
            let value = estimate_equilibrium_value(&game, iterations, seed)?;

            println!("ante={} bet_size={}", ante, bet_size);
            println!("Estimated P0 equilibrium value: {:+.5}", value);
            if let Some(reference) = known_value(&game_config) {
                println!("Known value: {:+.5} (error {:.5})", reference, (value - reference).abs());
            }
            Ok(())
        }
    }
}

/// Equilibrium value when it is known in closed form.
fn known_value(config: &KuhnConfig) -> Option<f64> {
    (*config == KuhnConfig::default()).then_some(NASH_VALUE)
}

fn train(
    game_config: KuhnConfig,
    trainer_config: TrainerConfig,
    iterations: u64,
    output: Option<&Path>,
    profile_output: Option<&Path>,
) -> Result<()> {
    let algorithm = trainer_config.algorithm;
    println!("=== {} on Kuhn Poker ===", algorithm);
    println!(
        "ante={} bet_size={} traversal={} delay={} seed={:?}",
        game_config.ante,
        game_config.bet_size,
        trainer_config.traversal(),
        trainer_config.delay,
        trainer_config.seed
    );
    println!();

    let mut trainer = Trainer::new(KuhnPoker::new(game_config), trainer_config.clone());

    let bar = ProgressBar::new(iterations);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    bar.set_message(algorithm.to_string());

    let interval = (iterations / 100).max(1);
    let values = trainer.train_with_callback(iterations, interval, |stats| {
        bar.set_position(stats.iterations);
    })?;
    bar.finish_and_clear();

    let exploitability = trainer.record_exploitability()?;
    let stats = trainer.stats();
    let reference = known_value(&game_config);
    let summary = ConvergenceSummary::from_values(&values, reference);
    let profile = trainer.get_strategy_profile();

    println!(
        "Trained {} iterations in {:.2}s ({:.0} it/s), {} info sets",
        stats.iterations, stats.elapsed_seconds, stats.iterations_per_second, stats.info_sets
    );
    println!("Average P0 value:   {:+.5}", summary.mean);
    println!(
        "Tail mean (last {}): {:+.5} ± {:.5}",
        summary.tail_window, summary.tail_mean, summary.tail_std
    );
    if let (Some(reference), Some(error)) = (summary.reference, summary.error) {
        println!("Equilibrium value:  {:+.5} (error {:.5})", reference, error);
    }
    println!("Exploitability:     {:.6}", exploitability);
    if reference.is_some() {
        println!("Distance to Nash:   {:.5}", profile.distance(&nash_reference()));
    }
    println!();
    print_profile(&profile);

    if let Some(path) = profile_output {
        profile
            .save_json(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("saved strategy profile to {}", path.display());
    }

    if let Some(path) = output {
        let result = TrainOutput {
            config: game_config,
            trainer: trainer_config,
            algorithm: algorithm.to_string(),
            strategy_profile: profile,
            final_expected_value: tail_mean(&values, FINAL_VALUE_WINDOW),
            num_iterations: trainer.iteration(),
            exploitability,
        };
        write_json(path, &result)?;
    }

    Ok(())
}

fn run_comparison(
    game_config: KuhnConfig,
    iterations: u64,
    delay: u64,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let game = KuhnPoker::new(game_config);
    let reference = known_value(&game_config);
    let configs = standard_configs(delay, seed);

    log::info!(
        "comparing {} engines over {} iterations each",
        configs.len(),
        iterations
    );
    let reports = compare(&game, &configs, iterations, reference)?;

    println!(
        "{:<14} {:>10} {:>10} {:>9} {:>14} {:>9} {:>8}",
        "Algorithm", "Mean", "Tail", "Error", "Exploitability", "Distance", "Time"
    );
    for report in &reports {
        let error = report
            .summary
            .error
            .map(|e| format!("{:.5}", e))
            .unwrap_or_else(|| "-".to_string());
        let distance = if reference.is_some() {
            format!("{:.5}", report.profile.distance(&nash_reference()))
        } else {
            "-".to_string()
        };
        println!(
            "{:<14} {:>+10.5} {:>+10.5} {:>9} {:>14.6} {:>9} {:>7.2}s",
            report.algorithm.name(),
            report.summary.mean,
            report.summary.tail_mean,
            error,
            report.exploitability,
            distance,
            report.elapsed_seconds
        );
    }

    if let Some(best) = reports
        .iter()
        .min_by(|a, b| a.exploitability.total_cmp(&b.exploitability))
    {
        println!();
        println!("Least exploitable: {}", best.algorithm);
    }

    if let Some(path) = output {
        write_json(path, &reports)?;
    }
    Ok(())
}

fn print_profile(profile: &StrategyProfile) {
    println!("{:<6} Strategy", "Info");
    for (key, actions) in profile.iter() {
        let cells: Vec<String> = actions
            .iter()
            .map(|(action, p)| format!("{}={:.3}", action, p))
            .collect();
        println!("{:<6} {}", key, cells.join("  "));
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved results to {}", path.display());
    Ok(())
}

