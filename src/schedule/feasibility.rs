//! Fairness target derivation.
//!
//! Every player faces `rounds_per_player * (players_per_round - 1)`
//! opponent slots over the tournament. Spread as evenly as possible over
//! the other players, each pairing meets either a fixed number of times
//! (the slots divide evenly) or one of two adjacent counts. The target
//! records that ceiling, the counts regarded as fair, and how many
//! opponent-matrix entries must hold a fair count for a schedule to be
//! accepted.

use super::config::ScheduleConfig;
use crate::error::ConfigError;

/// Fairness target for one schedule shape. Immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairnessTarget {
    /// Opponent encounters each player accumulates over the tournament.
    pub total_opponent_slots: usize,

    /// Number of distinct opponents each player should face.
    pub distinct_opponents: usize,

    /// Minimum number of fair opponent-matrix entries for acceptance.
    pub opp_score_goal: usize,

    /// Ceiling on how often any single pair may meet.
    pub max_opp_play_count: u32,

    /// Meeting counts that count toward the score, ascending.
    pub valid_opp_play_counts: Vec<u32>,
}

impl FairnessTarget {
    /// Derives the fairness target for `config`.
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] when the
    /// player-rounds cannot be split evenly into rounds, and with the other
    /// [`ConfigError`] variants for malformed shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use tourney_gen::schedule::{FairnessTarget, ScheduleConfig};
    ///
    /// let target = FairnessTarget::derive(&ScheduleConfig::new(4, 3, 2)).unwrap();
    /// assert_eq!(target.opp_score_goal, 12);
    /// assert_eq!(target.max_opp_play_count, 1);
    /// assert_eq!(target.valid_opp_play_counts, vec![1]);
    /// ```
    pub fn derive(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let total_opponent_slots =
            config.num_rounds_per_player * (config.num_players_per_round - 1);
        let distinct_opponents = (config.num_players - 1).min(total_opponent_slots);
        let opp_score_goal = distinct_opponents * config.num_players;

        let (max_opp_play_count, valid_opp_play_counts) =
            if total_opponent_slots <= distinct_opponents {
                (1, vec![1])
            } else if total_opponent_slots % distinct_opponents == 0 {
                let max = (total_opponent_slots / distinct_opponents) as u32;
                (max, vec![max])
            } else {
                let max = total_opponent_slots.div_ceil(distinct_opponents) as u32;
                (max, vec![max - 1, max])
            };

        Ok(Self {
            total_opponent_slots,
            distinct_opponents,
            opp_score_goal,
            max_opp_play_count,
            valid_opp_play_counts,
        })
    }

    /// Whether `count` is a fair number of meetings for one pair.
    #[inline]
    pub fn is_valid_count(&self, count: u32) -> bool {
        self.valid_opp_play_counts.contains(&count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_invalid_combination() {
        let err = FairnessTarget::derive(&ScheduleConfig::new(5, 2, 4)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidConfiguration {
                players: 5,
                rounds_per_player: 2,
                per_round: 4
            }
        );
    }

    #[test]
    fn test_single_meeting() {
        let target = FairnessTarget::derive(&ScheduleConfig::new(4, 3, 2)).unwrap();
        assert_eq!(target.total_opponent_slots, 3);
        assert_eq!(target.distinct_opponents, 3);
        assert_eq!(target.opp_score_goal, 12);
        assert_eq!(target.max_opp_play_count, 1);
        assert_eq!(target.valid_opp_play_counts, vec![1]);
    }

    #[test]
    fn test_sparse_schedule() {
        // 16 players, 5 rounds of 4: 15 slots, 15 possible opponents.
        let target = FairnessTarget::derive(&ScheduleConfig::default()).unwrap();
        assert_eq!(target.total_opponent_slots, 15);
        assert_eq!(target.distinct_opponents, 15);
        assert_eq!(target.opp_score_goal, 240);
        assert_eq!(target.valid_opp_play_counts, vec![1]);

        // 10 players, 2 rounds of 2: only 2 of 9 opponents can be met.
        let target = FairnessTarget::derive(&ScheduleConfig::new(10, 2, 2)).unwrap();
        assert_eq!(target.distinct_opponents, 2);
        assert_eq!(target.opp_score_goal, 20);
        assert_eq!(target.max_opp_play_count, 1);
    }

    #[test]
    fn test_even_repeat() {
        // 4 players, 6 rounds of 2: 6 slots over 3 opponents, twice each.
        let target = FairnessTarget::derive(&ScheduleConfig::new(4, 6, 2)).unwrap();
        assert_eq!(target.max_opp_play_count, 2);
        assert_eq!(target.valid_opp_play_counts, vec![2]);
        assert_eq!(target.opp_score_goal, 12);
    }

    #[test]
    fn test_uneven_repeat() {
        // 4 players, 7 rounds of 2: 7 slots over 3 opponents.
        let target = FairnessTarget::derive(&ScheduleConfig::new(4, 7, 2)).unwrap();
        assert_eq!(target.max_opp_play_count, 3);
        assert_eq!(target.valid_opp_play_counts, vec![2, 3]);
        assert!(target.is_valid_count(2));
        assert!(!target.is_valid_count(1));
    }

    #[test]
    fn test_single_player_rounds() {
        let target = FairnessTarget::derive(&ScheduleConfig::new(3, 2, 1)).unwrap();
        assert_eq!(target.total_opponent_slots, 0);
        assert_eq!(target.opp_score_goal, 0);
        assert_eq!(target.max_opp_play_count, 1);
    }

    proptest! {
        #[test]
        fn prop_target_matches_formulas(
            players in 1usize..40,
            rounds in 1usize..12,
            per_round_seed in 0usize..40,
        ) {
            let per_round = per_round_seed % players + 1;
            let config = ScheduleConfig::new(players, rounds, per_round);
            let derived = FairnessTarget::derive(&config);

            if (players * rounds) % per_round != 0 {
                let is_invalid = matches!(derived, Err(ConfigError::InvalidConfiguration { .. }));
                prop_assert!(is_invalid);
            } else {
                let target = derived.unwrap();
                let slots = rounds * (per_round - 1);
                let distinct = (players - 1).min(slots);
                prop_assert_eq!(target.opp_score_goal, distinct * players);

                if slots <= distinct {
                    prop_assert_eq!(target.max_opp_play_count, 1);
                    prop_assert_eq!(target.valid_opp_play_counts.clone(), vec![1]);
                } else if slots % distinct == 0 {
                    prop_assert_eq!(target.max_opp_play_count as usize, slots / distinct);
                    prop_assert_eq!(target.valid_opp_play_counts.len(), 1);
                } else {
                    let max = target.max_opp_play_count as usize;
                    prop_assert!(max * distinct >= slots);
                    prop_assert!((max - 1) * distinct < slots);
                    prop_assert_eq!(
                        target.valid_opp_play_counts.clone(),
                        vec![max as u32 - 1, max as u32]
                    );
                }

                prop_assert_eq!(FairnessTarget::derive(&config).unwrap(), target);
            }
        }
    }
}
