//! Worker → coordinator messages.

use crate::error::ConfigError;
use crate::schedule::Attempt;

/// A message sent from a search worker to the coordinator.
///
/// Messages from one worker arrive in the order it sent them; there is no
/// ordering across workers.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// The schedule shape cannot be satisfied. Fatal to the run.
    InvalidConfiguration {
        worker: usize,
        error: ConfigError,
    },

    /// A full batch of evaluations was completed.
    Telemetry {
        worker: usize,
        /// Size of the batch, not the worker's running total.
        evals_performed: u64,
        /// Best score this worker has seen so far.
        best_score: usize,
    },

    /// An accepted schedule.
    Result {
        worker: usize,
        attempt: Box<Attempt>,
    },

    /// The worker observed cancellation and is exiting.
    Stopped {
        worker: usize,
        /// Evaluations performed by the worker, including the unsent partial batch.
        evals: u64,
    },

    /// The worker panicked.
    WorkerFailed {
        worker: usize,
        reason: String,
    },
}

impl WorkerMessage {
    /// Index of the worker that sent the message.
    pub fn worker(&self) -> usize {
        match *self {
            WorkerMessage::InvalidConfiguration { worker, .. }
            | WorkerMessage::Telemetry { worker, .. }
            | WorkerMessage::Result { worker, .. }
            | WorkerMessage::Stopped { worker, .. }
            | WorkerMessage::WorkerFailed { worker, .. } => worker,
        }
    }
}
