//! Parallel schedule search.
//!
//! A fixed pool of independent workers each run their own [`SearchLoop`]
//! with a private random source and report to a single [`Coordinator`]
//! over a [`WorkerMessage`] channel. Workers share no mutable state; the
//! coordinator alone aggregates evaluation counts and enforces the
//! evaluation and time budgets.

mod config;
mod coordinator;
mod message;
mod worker;

pub use config::SearchConfig;
pub use coordinator::{format_hms, Control, Coordinator, CoordinatorState, Outcome, SearchResult};
pub use message::WorkerMessage;
pub use worker::{run_worker, worker_rng, EvalCounter, SearchLoop, Step, WorkerExit};
