//! Schedule data model.

use serde::{Deserialize, Serialize};

/// A player, identified by its index in `0..num_players`.
pub type Player = usize;

/// One group of distinct players competing together.
///
/// Member order carries no meaning; it records the order in which the
/// builder drew the players.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Round(pub Vec<Player>);

impl Round {
    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }

    pub fn players(&self) -> &[Player] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, player: Player) -> bool {
        self.0.contains(&player)
    }

    pub(crate) fn push(&mut self, player: Player) {
        self.0.push(player);
    }
}

/// A candidate schedule, built from scratch for every try.
///
/// `opponent_matrix[p][o]` counts the rounds `p` and `o` have shared. Both
/// orientations are incremented together so the matrix stays symmetric;
/// the diagonal is never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Descriptive label, e.g. `"16 PLAYERS - 5 ROUNDS PER PLAYER"`.
    pub comment: String,

    /// Completed rounds in construction order.
    pub rounds: Vec<Round>,

    /// Rounds played so far, per player.
    pub rounds_per_player: Vec<usize>,

    /// Pairwise meeting counts.
    pub opponent_matrix: Vec<Vec<u32>>,

    /// Fairness score, set once the attempt has been scored.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub opp_score: Option<usize>,

    /// Set when construction could not continue.
    #[serde(skip)]
    pub aborted: bool,
}

impl Attempt {
    /// Creates an empty attempt for `num_players` players.
    pub fn new(num_players: usize, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            rounds: Vec::new(),
            rounds_per_player: vec![0; num_players],
            opponent_matrix: vec![vec![0; num_players]; num_players],
            opp_score: None,
            aborted: false,
        }
    }

    pub fn num_players(&self) -> usize {
        self.rounds_per_player.len()
    }

    /// Whether every player has played `rounds_per_player` rounds.
    pub fn is_complete(&self, rounds_per_player: usize) -> bool {
        self.rounds_per_player.iter().all(|&n| n >= rounds_per_player)
    }

    /// Meeting count between `a` and `b`.
    #[inline]
    pub fn meetings(&self, a: Player, b: Player) -> u32 {
        self.opponent_matrix[a][b]
    }
}
