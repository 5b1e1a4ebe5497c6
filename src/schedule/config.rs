//! Schedule shape configuration.

use crate::error::ConfigError;

/// Shape of the tournament to schedule.
///
/// # Examples
///
/// ```
/// use tourney_gen::schedule::ScheduleConfig;
///
/// let config = ScheduleConfig::default()
///     .with_num_players(8)
///     .with_num_rounds_per_player(7)
///     .with_num_players_per_round(2);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_rounds(), 28);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Number of players, indexed `0..num_players`.
    pub num_players: usize,

    /// Number of rounds every player must play.
    pub num_rounds_per_player: usize,

    /// Number of players competing together in one round.
    pub num_players_per_round: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            num_players: 16,
            num_rounds_per_player: 5,
            num_players_per_round: 4,
        }
    }
}

impl ScheduleConfig {
    /// Creates a configuration from the three shape parameters.
    pub fn new(
        num_players: usize,
        num_rounds_per_player: usize,
        num_players_per_round: usize,
    ) -> Self {
        Self {
            num_players,
            num_rounds_per_player,
            num_players_per_round,
        }
    }

    pub fn with_num_players(mut self, n: usize) -> Self {
        self.num_players = n;
        self
    }

    pub fn with_num_rounds_per_player(mut self, n: usize) -> Self {
        self.num_rounds_per_player = n;
        self
    }

    pub fn with_num_players_per_round(mut self, n: usize) -> Self {
        self.num_players_per_round = n;
        self
    }

    /// Total number of rounds in a complete schedule.
    ///
    /// Only meaningful once [`validate`](Self::validate) succeeds.
    pub fn num_rounds(&self) -> usize {
        self.num_players * self.num_rounds_per_player / self.num_players_per_round
    }

    /// Descriptive label attached to every attempt.
    pub fn label(&self) -> String {
        format!(
            "{} PLAYERS - {} ROUNDS PER PLAYER",
            self.num_players, self.num_rounds_per_player
        )
    }

    /// Validates the configuration.
    ///
    /// Checks that every parameter is positive, that a round fits within
    /// the player pool, and that the player-rounds divide evenly into
    /// rounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players == 0 {
            return Err(ConfigError::NonPositive { name: "num_players" });
        }
        if self.num_rounds_per_player == 0 {
            return Err(ConfigError::NonPositive {
                name: "num_rounds_per_player",
            });
        }
        if self.num_players_per_round == 0 {
            return Err(ConfigError::NonPositive {
                name: "num_players_per_round",
            });
        }
        if self.num_players_per_round > self.num_players {
            return Err(ConfigError::RoundTooLarge {
                players: self.num_players,
                per_round: self.num_players_per_round,
            });
        }
        if (self.num_players * self.num_rounds_per_player) % self.num_players_per_round != 0 {
            return Err(ConfigError::InvalidConfiguration {
                players: self.num_players,
                rounds_per_player: self.num_rounds_per_player,
                per_round: self.num_players_per_round,
            });
        }
        Ok(())
    }
}
