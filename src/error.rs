//! Configuration errors.

use thiserror::Error;

/// Errors raised while validating a schedule or search configuration.
///
/// All variants are fatal to a run and are detected before the first
/// attempt is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A schedule shape parameter is zero.
    #[error("{name} must be positive")]
    NonPositive {
        /// Name of the offending parameter.
        name: &'static str,
    },

    /// A round cannot hold more players than exist.
    #[error("players per round ({per_round}) exceeds number of players ({players})")]
    RoundTooLarge {
        /// Configured number of players.
        players: usize,
        /// Configured players per round.
        per_round: usize,
    },

    /// `players * rounds_per_player` is not a multiple of `players_per_round`,
    /// so no schedule can give every player the same number of rounds.
    #[error(
        "invalid combination: {players} players x {rounds_per_player} rounds \
         cannot be split into rounds of {per_round}"
    )]
    InvalidConfiguration {
        /// Configured number of players.
        players: usize,
        /// Configured rounds per player.
        rounds_per_player: usize,
        /// Configured players per round.
        per_round: usize,
    },

    /// The worker pool must contain at least one worker.
    #[error("num_threads must be positive")]
    NoWorkers,

    /// Telemetry batches must be non-empty.
    #[error("telemetry_interval must be positive")]
    ZeroTelemetryInterval,
}

/// Errors that prevent a search from running at all.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The worker thread pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
