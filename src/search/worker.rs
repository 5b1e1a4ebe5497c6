//! Per-worker search loop.
//!
//! Each worker repeatedly builds an attempt and scores it until one is
//! accepted or the coordinator cancels the run. Aborted attempts are
//! retried immediately and do not count as evaluations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::message::WorkerMessage;
use crate::error::ConfigError;
use crate::schedule::{Attempt, AttemptBuilder, FairnessScorer, ScheduleConfig};

/// Counts completed evaluations and cuts them into fixed-size batches.
#[derive(Debug, Clone)]
pub struct EvalCounter {
    interval: u64,
    total: u64,
}

impl EvalCounter {
    /// Creates a counter emitting one batch every `interval` evaluations.
    pub fn new(interval: u64) -> Self {
        Self { interval, total: 0 }
    }

    /// Records one evaluation. Returns the batch size whenever a batch fills.
    pub fn record(&mut self) -> Option<u64> {
        self.total += 1;
        if self.interval > 0 && self.total.is_multiple_of(self.interval) {
            Some(self.interval)
        } else {
            None
        }
    }

    /// Evaluations recorded so far.
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Result of a single search step.
#[derive(Debug)]
pub enum Step {
    /// Construction got stuck; nothing was evaluated.
    Aborted,

    /// The attempt was built and scored below the goal.
    Rejected {
        score: usize,
        batch: Option<u64>,
    },

    /// The attempt reached the goal.
    Accepted {
        attempt: Box<Attempt>,
        batch: Option<u64>,
    },
}

/// Why a worker's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// An accepted schedule was sent.
    Found,

    /// The schedule shape is infeasible.
    InvalidConfiguration,

    /// The cancellation flag was raised.
    Cancelled,

    /// The coordinator stopped listening.
    Disconnected,
}

/// Search state owned by one worker.
#[derive(Debug, Clone)]
pub struct SearchLoop {
    worker: usize,
    builder: AttemptBuilder,
    scorer: FairnessScorer,
    counter: EvalCounter,
}

impl SearchLoop {
    /// Derives this worker's own fairness target and sets up the loop.
    pub fn new(
        worker: usize,
        config: ScheduleConfig,
        telemetry_interval: u64,
    ) -> Result<Self, ConfigError> {
        let builder = AttemptBuilder::new(config)?;
        let scorer = FairnessScorer::new(builder.target().clone());
        Ok(Self {
            worker,
            builder,
            scorer,
            counter: EvalCounter::new(telemetry_interval),
        })
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Completed evaluations so far.
    pub fn evals(&self) -> u64 {
        self.counter.total()
    }

    /// Best score seen so far.
    pub fn best_score(&self) -> usize {
        self.scorer.best_score()
    }

    /// Builds and scores one attempt.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Step {
        let Some(mut attempt) = self.builder.build_attempt(rng) else {
            return Step::Aborted;
        };
        let batch = self.counter.record();
        if self.scorer.evaluate(&mut attempt) {
            Step::Accepted {
                attempt: Box::new(attempt),
                batch,
            }
        } else {
            Step::Rejected {
                score: attempt.opp_score.unwrap_or_default(),
                batch,
            }
        }
    }

    /// Runs until an attempt is accepted, `cancel` is raised, or the
    /// coordinator hangs up.
    ///
    /// Sends a [`WorkerMessage::Telemetry`] for every full batch and a
    /// [`WorkerMessage::Result`] for the accepted attempt.
    pub fn run<R: Rng>(
        &mut self,
        rng: &mut R,
        tx: &Sender<WorkerMessage>,
        cancel: &AtomicBool,
    ) -> WorkerExit {
        loop {
            if cancel.load(Ordering::Relaxed) {
                return WorkerExit::Cancelled;
            }

            let (batch, accepted) = match self.step(rng) {
                Step::Aborted => continue,
                Step::Rejected { batch, .. } => (batch, None),
                Step::Accepted { attempt, batch } => (batch, Some(attempt)),
            };

            if let Some(evals_performed) = batch {
                let msg = WorkerMessage::Telemetry {
                    worker: self.worker,
                    evals_performed,
                    best_score: self.scorer.best_score(),
                };
                if tx.send(msg).is_err() {
                    return WorkerExit::Disconnected;
                }
            }

            if let Some(attempt) = accepted {
                let msg = WorkerMessage::Result {
                    worker: self.worker,
                    attempt,
                };
                if tx.send(msg).is_err() {
                    return WorkerExit::Disconnected;
                }
                return WorkerExit::Found;
            }
        }
    }
}

/// Creates the random source for `worker`.
///
/// Workers never share a sequence: with a base seed each gets `seed + worker`,
/// otherwise each draws its own seed from the thread-local entropy source.
pub fn worker_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

/// Full lifecycle of one worker: set up, search, acknowledge shutdown.
///
/// Always ends by sending [`WorkerMessage::Stopped`] (ignored if the
/// coordinator is gone).
pub fn run_worker(
    worker: usize,
    schedule: ScheduleConfig,
    telemetry_interval: u64,
    seed: Option<u64>,
    tx: &Sender<WorkerMessage>,
    cancel: &AtomicBool,
) -> WorkerExit {
    debug!(worker, "worker starting");

    let (exit, evals) = match SearchLoop::new(worker, schedule, telemetry_interval) {
        Ok(mut search) => {
            let mut rng = worker_rng(seed, worker);
            let exit = search.run(&mut rng, tx, cancel);
            (exit, search.evals())
        }
        Err(error) => {
            let _ = tx.send(WorkerMessage::InvalidConfiguration { worker, error });
            (WorkerExit::InvalidConfiguration, 0)
        }
    };

    debug!(worker, ?exit, evals, "worker exiting");
    let _ = tx.send(WorkerMessage::Stopped { worker, evals });
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_counter_flushes_full_batches_only() {
        let mut counter = EvalCounter::new(100_000);
        let batches: Vec<u64> = (0..250_000).filter_map(|_| counter.record()).collect();
        assert_eq!(batches, vec![100_000, 100_000]);
        assert_eq!(counter.total(), 250_000);
    }

    #[test]
    fn test_step_counts_only_completed_attempts() {
        let mut search = SearchLoop::new(0, ScheduleConfig::new(10, 10, 2), 100).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut completed = 0;
        for _ in 0..300 {
            match search.step(&mut rng) {
                Step::Aborted => {}
                Step::Rejected { .. } | Step::Accepted { .. } => completed += 1,
            }
        }
        assert_eq!(search.evals(), completed);
    }

    #[test]
    fn test_run_finds_easy_schedule() {
        let (tx, rx) = mpsc::channel();
        let cancel = AtomicBool::new(false);
        let mut search = SearchLoop::new(2, ScheduleConfig::new(4, 3, 2), 1).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let exit = search.run(&mut rng, &tx, &cancel);
        assert_eq!(exit, WorkerExit::Found);
        drop(tx);

        let messages: Vec<WorkerMessage> = rx.iter().collect();
        let telemetry = messages
            .iter()
            .filter(|m| matches!(m, WorkerMessage::Telemetry { .. }))
            .count() as u64;
        assert_eq!(telemetry, search.evals());

        let Some(WorkerMessage::Result { worker, attempt }) = messages.last() else {
            panic!("last message should carry the result");
        };
        assert_eq!(*worker, 2);
        assert_eq!(attempt.opp_score, Some(12));
        assert_eq!(attempt.rounds_per_player, vec![3; 4]);
        for p in 0..4 {
            for o in 0..4 {
                if p != o {
                    assert_eq!(attempt.meetings(p, o), 1);
                }
            }
        }
    }

    #[test]
    fn test_run_honours_cancellation() {
        let (tx, rx) = mpsc::channel();
        let cancel = AtomicBool::new(true);
        let mut search = SearchLoop::new(0, ScheduleConfig::default(), 10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(search.run(&mut rng, &tx, &cancel), WorkerExit::Cancelled);
        assert_eq!(search.evals(), 0);
        drop(tx);
        assert!(rx.iter().next().is_none());
    }

    #[test]
    fn test_run_worker_reports_invalid_configuration() {
        let (tx, rx) = mpsc::channel();
        let cancel = AtomicBool::new(false);
        let exit = run_worker(4, ScheduleConfig::new(5, 2, 4), 10, Some(1), &tx, &cancel);
        assert_eq!(exit, WorkerExit::InvalidConfiguration);
        drop(tx);

        let messages: Vec<WorkerMessage> = rx.iter().collect();
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[0],
            WorkerMessage::InvalidConfiguration { worker: 4, .. }
        ));
        assert!(matches!(
            messages[1],
            WorkerMessage::Stopped { worker: 4, evals: 0 }
        ));
    }

    #[test]
    fn test_run_worker_stops_when_coordinator_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let cancel = AtomicBool::new(false);
        let exit = run_worker(0, ScheduleConfig::new(4, 3, 2), 1, Some(5), &tx, &cancel);
        assert_eq!(exit, WorkerExit::Disconnected);
    }

    #[test]
    fn test_worker_rngs_differ() {
        let a: u64 = worker_rng(Some(9), 0).random();
        let b: u64 = worker_rng(Some(9), 1).random();
        let again: u64 = worker_rng(Some(9), 0).random();
        assert_ne!(a, b);
        assert_eq!(a, again);

        let x: u64 = worker_rng(None, 0).random();
        let y: u64 = worker_rng(None, 0).random();
        assert_ne!(x, y);
    }
}
