//! Fairness scoring of completed attempts.

use super::feasibility::FairnessTarget;
use super::types::Attempt;

/// Scores completed attempts against a [`FairnessTarget`].
///
/// Also remembers the best score it has seen; once that reaches the goal
/// the owning search loop is done.
#[derive(Debug, Clone)]
pub struct FairnessScorer {
    target: FairnessTarget,
    best_score: usize,
}

impl FairnessScorer {
    pub fn new(target: FairnessTarget) -> Self {
        Self {
            target,
            best_score: 0,
        }
    }

    pub fn target(&self) -> &FairnessTarget {
        &self.target
    }

    /// Best score recorded by [`evaluate`](Self::evaluate) so far.
    pub fn best_score(&self) -> usize {
        self.best_score
    }

    /// Whether some evaluated attempt has reached the goal.
    pub fn goal_reached(&self) -> bool {
        self.best_score >= self.target.opp_score_goal
    }

    /// Number of off-diagonal opponent-matrix entries holding a fair count.
    ///
    /// Pure: scoring the same attempt twice gives the same result.
    pub fn score(&self, attempt: &Attempt) -> usize {
        attempt
            .opponent_matrix
            .iter()
            .enumerate()
            .map(|(p, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(o, &count)| o != p && self.target.is_valid_count(count))
                    .count()
            })
            .sum()
    }

    /// Acceptance rule: not aborted and `score >= opp_score_goal`.
    pub fn accepts(&self, attempt: &Attempt, score: usize) -> bool {
        !attempt.aborted && score >= self.target.opp_score_goal
    }

    /// Scores `attempt`, stores the score on it and updates the best score.
    ///
    /// Returns whether the attempt is accepted.
    pub fn evaluate(&mut self, attempt: &mut Attempt) -> bool {
        let score = self.score(attempt);
        attempt.opp_score = Some(score);
        self.best_score = self.best_score.max(score);
        self.accepts(attempt, score)
    }
}
