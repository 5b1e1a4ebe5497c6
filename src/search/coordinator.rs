//! Worker pool coordination.
//!
//! [`Coordinator`] runs a fixed pool of [`SearchLoop`](super::SearchLoop)
//! workers on a dedicated rayon pool and consumes their messages on the
//! calling thread. All aggregate counters live in [`CoordinatorState`],
//! touched only by that single consumer.
//!
//! The run ends on the first accepted schedule, an invalid-configuration
//! report, a worker failure, or an exhausted evaluation/time budget. The
//! coordinator then raises the shared cancellation flag and waits for every
//! worker to leave its loop before returning.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::config::SearchConfig;
use super::message::WorkerMessage;
use super::worker::run_worker;
use crate::error::{ConfigError, SearchError};
use crate::schedule::{Attempt, FairnessTarget, ScheduleConfig};

/// How a run ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A worker found an accepted schedule. First report wins.
    Found(Box<Attempt>),

    /// The schedule shape cannot be satisfied.
    InvalidConfiguration(ConfigError),

    /// The evaluation or time budget ran out.
    BudgetExhausted { total_evals: u64, elapsed: Duration },

    /// A worker died or every worker left without a result.
    WorkerFailed {
        worker: Option<usize>,
        reason: String,
    },
}

impl Outcome {
    /// Process exit status for this outcome.
    ///
    /// `0` found, `2` invalid configuration, `3` budget exhausted,
    /// `1` worker failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Found(_) => 0,
            Outcome::WorkerFailed { .. } => 1,
            Outcome::InvalidConfiguration(_) => 2,
            Outcome::BudgetExhausted { .. } => 3,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

/// Result of a coordinated search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: Outcome,

    /// Evaluations reported through telemetry. Partial batches are not
    /// included.
    pub total_evals: u64,

    /// Best score reported by any worker.
    pub best_score: usize,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,

    /// Workers that acknowledged shutdown.
    pub stopped_workers: usize,
}

/// Whether the consumer loop keeps going.
#[derive(Debug)]
pub enum Control {
    Continue,
    Stop(Outcome),
}

/// Aggregate state owned by the coordinator's consumer loop.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    num_threads: usize,
    eval_max: u64,
    time_max: Duration,
    total_evals: u64,
    message_count: u64,
    best_score: usize,
    running: usize,
}

impl CoordinatorState {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            num_threads: config.num_threads.max(1),
            eval_max: config.eval_max,
            time_max: config.time_max,
            total_evals: 0,
            message_count: 0,
            best_score: 0,
            running: config.num_threads,
        }
    }

    pub fn total_evals(&self) -> u64 {
        self.total_evals
    }

    pub fn best_score(&self) -> usize {
        self.best_score
    }

    pub fn running(&self) -> usize {
        self.running
    }

    fn time_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.time_max
    }

    fn budget_exhausted(&self, elapsed: Duration) -> Outcome {
        info!(
            total_evals = self.total_evals,
            elapsed = %format_hms(elapsed),
            "search budget exhausted"
        );
        Outcome::BudgetExhausted {
            total_evals: self.total_evals,
            elapsed,
        }
    }

    /// Handles one worker message, `elapsed` since the run started.
    pub fn handle(&mut self, msg: WorkerMessage, elapsed: Duration) -> Control {
        match msg {
            WorkerMessage::Telemetry {
                worker,
                evals_performed,
                best_score,
            } => {
                self.total_evals += evals_performed;
                self.message_count += 1;
                self.best_score = self.best_score.max(best_score);
                debug!(worker, evals_performed, best_score, "telemetry");

                if self.message_count.is_multiple_of(self.num_threads as u64) {
                    info!(
                        "evaluated {} groupings in {} ({:.0} µs per group, best score {})",
                        self.total_evals,
                        format_hms(elapsed),
                        micros_per_eval(elapsed, self.total_evals),
                        self.best_score
                    );
                }

                if self.total_evals >= self.eval_max || self.time_exhausted(elapsed) {
                    return Control::Stop(self.budget_exhausted(elapsed));
                }
                Control::Continue
            }
            WorkerMessage::Result { worker, attempt } => {
                if let Some(score) = attempt.opp_score {
                    self.best_score = self.best_score.max(score);
                }
                info!(worker, score = ?attempt.opp_score, "found new result");
                Control::Stop(Outcome::Found(attempt))
            }
            WorkerMessage::InvalidConfiguration { worker, error } => {
                warn!(worker, %error, "invalid combination");
                Control::Stop(Outcome::InvalidConfiguration(error))
            }
            WorkerMessage::Stopped { worker, evals } => {
                self.running = self.running.saturating_sub(1);
                debug!(worker, evals, running = self.running, "worker exited");
                Control::Continue
            }
            WorkerMessage::WorkerFailed { worker, reason } => {
                error!(worker, %reason, "worker failed");
                Control::Stop(Outcome::WorkerFailed {
                    worker: Some(worker),
                    reason,
                })
            }
        }
    }

    /// Consumes messages until the run must stop.
    ///
    /// The time budget is checked while waiting as well, so a run whose
    /// workers report rarely still ends on time.
    pub fn drive(&mut self, rx: &Receiver<WorkerMessage>, start: Instant) -> Outcome {
        loop {
            let elapsed = start.elapsed();
            if self.time_exhausted(elapsed) {
                return self.budget_exhausted(elapsed);
            }
            match rx.recv_timeout(self.time_max - elapsed) {
                Ok(msg) => {
                    if let Control::Stop(outcome) = self.handle(msg, start.elapsed()) {
                        return outcome;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Outcome::WorkerFailed {
                        worker: None,
                        reason: "all workers exited without a result".into(),
                    };
                }
            }
        }
    }
}

/// Runs the parallel schedule search.
///
/// # Examples
///
/// ```no_run
/// use tourney_gen::schedule::ScheduleConfig;
/// use tourney_gen::search::{Coordinator, SearchConfig};
///
/// let coordinator = Coordinator::new(
///     ScheduleConfig::new(8, 7, 2),
///     SearchConfig::default().with_num_threads(4),
/// )
/// .unwrap();
/// let result = coordinator.run().unwrap();
/// println!("exit code {}", result.outcome.exit_code());
/// ```
#[derive(Debug, Clone)]
pub struct Coordinator {
    schedule: ScheduleConfig,
    search: SearchConfig,
}

impl Coordinator {
    /// Creates a coordinator. Fails if the search configuration is invalid.
    ///
    /// An infeasible schedule shape is not an error here; it is reported as
    /// [`Outcome::InvalidConfiguration`] by [`run`](Self::run).
    pub fn new(schedule: ScheduleConfig, search: SearchConfig) -> Result<Self, ConfigError> {
        search.validate()?;
        Ok(Self { schedule, search })
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    pub fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// Runs the search to completion.
    ///
    /// Returns `Err` only if the worker pool cannot be created.
    pub fn run(&self) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let mut state = CoordinatorState::new(&self.search);

        if let Err(error) = FairnessTarget::derive(&self.schedule) {
            warn!(%error, "invalid combination");
            return Ok(SearchResult {
                outcome: Outcome::InvalidConfiguration(error),
                total_evals: 0,
                best_score: 0,
                elapsed: start.elapsed(),
                stopped_workers: 0,
            });
        }

        let num_threads = self.search.num_threads;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("tourney-worker-{i}"))
            .build()?;

        info!("Running with {num_threads} threads...");

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let outcome = pool.in_place_scope(|scope| {
            for worker in 0..num_threads {
                let tx = tx.clone();
                let cancel = Arc::clone(&cancel);
                let schedule = self.schedule;
                let interval = self.search.telemetry_interval;
                let seed = self.search.seed;
                scope.spawn(move |_| {
                    let run = panic::catch_unwind(AssertUnwindSafe(|| {
                        run_worker(worker, schedule, interval, seed, &tx, &cancel)
                    }));
                    if let Err(payload) = run {
                        let _ = tx.send(WorkerMessage::WorkerFailed {
                            worker,
                            reason: panic_reason(payload.as_ref()),
                        });
                    }
                });
            }
            drop(tx);

            let outcome = state.drive(&rx, start);
            cancel.store(true, Ordering::Relaxed);
            outcome
        });

        // Every worker has returned; collect the shutdown acknowledgements.
        let stopped_workers = rx
            .try_iter()
            .filter(|msg| matches!(msg, WorkerMessage::Stopped { .. }))
            .count()
            + (num_threads - state.running());
        debug!(stopped_workers, "worker pool shut down");

        Ok(SearchResult {
            outcome,
            total_evals: state.total_evals(),
            best_score: state.best_score(),
            elapsed: start.elapsed(),
            stopped_workers,
        })
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Average microseconds per evaluation.
fn micros_per_eval(elapsed: Duration, evals: u64) -> f64 {
    if evals == 0 {
        0.0
    } else {
        elapsed.as_secs_f64() * 1e6 / evals as f64
    }
}

/// Formats a duration as `HH:MM:SS`.
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
