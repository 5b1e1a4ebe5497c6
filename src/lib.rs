//! Randomized search for fair round-robin tournament schedules.
//!
//! A schedule places `num_players` players into rounds of
//! `num_players_per_round` so that everyone plays `num_rounds_per_player`
//! rounds. Instead of constructing a schedule exactly, the search builds
//! candidates at random and keeps the first whose opponent-meeting counts
//! are spread fairly:
//!
//! - **[`schedule`]**: schedule shape, fairness target, randomized attempt
//!   builder and fairness scorer.
//! - **[`search`]**: per-worker search loop and the coordinator that runs a
//!   pool of workers under an evaluation and time budget.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use tourney_gen::schedule::{AttemptBuilder, FairnessScorer, ScheduleConfig};
//!
//! let builder = AttemptBuilder::new(ScheduleConfig::new(4, 3, 2)).unwrap();
//! let mut scorer = FairnessScorer::new(builder.target().clone());
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let accepted = loop {
//!     if let Some(mut attempt) = builder.build_attempt(&mut rng) {
//!         if scorer.evaluate(&mut attempt) {
//!             break attempt;
//!         }
//!     }
//! };
//! assert_eq!(accepted.opp_score, Some(12));
//! ```

pub mod error;
pub mod schedule;
pub mod search;

pub use error::{ConfigError, SearchError};
