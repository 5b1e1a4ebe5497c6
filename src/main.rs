//! Tournament schedule search CLI.
//!
//! Searches for a fair schedule with a pool of workers and prints the
//! accepted schedule as JSON on stdout. Progress goes to the log.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tourney_gen::schedule::ScheduleConfig;
use tourney_gen::search::{format_hms, Coordinator, Outcome, SearchConfig};

#[derive(Parser, Debug)]
#[command(name = "tourney-gen")]
#[command(about = "Randomized search for fair round-robin tournament schedules")]
struct Cli {
    /// Number of players
    #[arg(short = 'n', long, env = "TOURNEY_PLAYERS", default_value_t = 16)]
    players: usize,

    /// Rounds every player plays
    #[arg(short, long, env = "TOURNEY_ROUNDS_PER_PLAYER", default_value_t = 5)]
    rounds_per_player: usize,

    /// Players competing in each round
    #[arg(short = 'g', long, env = "TOURNEY_PLAYERS_PER_ROUND", default_value_t = 4)]
    players_per_round: usize,

    /// Number of search workers
    #[arg(short, long, env = "TOURNEY_THREADS", default_value_t = 6)]
    threads: usize,

    /// Give up after this many evaluated schedules
    #[arg(long, env = "TOURNEY_EVAL_MAX", default_value_t = 1_000_000_000)]
    eval_max: u64,

    /// Give up after this many minutes
    #[arg(long, env = "TOURNEY_TIME_MAX_MINUTES", default_value_t = 60)]
    time_max_minutes: u64,

    /// Evaluations per progress message from each worker
    #[arg(long, env = "TOURNEY_TELEMETRY_INTERVAL", default_value_t = 100_000)]
    telemetry_interval: u64,

    /// Base random seed (worker i uses seed + i)
    #[arg(long, env = "TOURNEY_SEED")]
    seed: Option<u64>,

    /// Also write the accepted schedule to this file (pretty JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig::new(self.players, self.rounds_per_player, self.players_per_round)
    }

    fn search_config(&self) -> SearchConfig {
        let config = SearchConfig::default()
            .with_num_threads(self.threads)
            .with_eval_max(self.eval_max)
            .with_time_max_minutes(self.time_max_minutes)
            .with_telemetry_interval(self.telemetry_interval);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let coordinator = Coordinator::new(cli.schedule_config(), cli.search_config())?;
    let result = coordinator.run()?;

    match &result.outcome {
        Outcome::Found(attempt) => {
            println!("{}", serde_json::to_string(attempt.as_ref())?);
            if let Some(path) = &cli.output {
                let json = serde_json::to_string_pretty(attempt.as_ref())?;
                std::fs::write(path, json)
                    .with_context(|| format!("writing schedule to {}", path.display()))?;
                info!(path = %path.display(), "schedule written");
            }
            info!(
                total_evals = result.total_evals,
                elapsed = %format_hms(result.elapsed),
                "search finished"
            );
        }
        Outcome::InvalidConfiguration(e) => {
            error!("invalid combination: {e}");
        }
        Outcome::BudgetExhausted {
            total_evals,
            elapsed,
        } => {
            info!(
                total_evals,
                elapsed = %format_hms(*elapsed),
                best_score = result.best_score,
                "no schedule found within budget"
            );
        }
        Outcome::WorkerFailed { worker, reason } => {
            error!(?worker, %reason, "search aborted");
        }
    }

    Ok(result.outcome.exit_code())
}
