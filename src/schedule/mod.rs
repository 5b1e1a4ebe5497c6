//! Tournament schedule construction and scoring.
//!
//! A schedule assigns players to rounds so that every player plays the
//! same number of rounds and every round has the same size. Candidate
//! schedules are built at random by [`AttemptBuilder`] and judged by
//! [`FairnessScorer`] against the [`FairnessTarget`] derived from the
//! [`ScheduleConfig`].

mod builder;
mod config;
mod feasibility;
mod scorer;
mod types;

pub use builder::AttemptBuilder;
pub use config::ScheduleConfig;
pub use feasibility::FairnessTarget;
pub use scorer::FairnessScorer;
pub use types::{Attempt, Player, Round};
