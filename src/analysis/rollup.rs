//! Vote rollups: per-choice sums and per-contest residual votes.

use crate::model::election::{Choice, Contest, Jurisdiction, VoteResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RollupError {
    #[error("No ballots cast")]
    NoBallotsCast,
    #[error("Vote counts out of range: {total_choice_votes} choice votes, {ballots_cast} ballots")]
    Overflow {
        total_choice_votes: u64,
        ballots_cast: u64,
    },
}

pub type RollupResult<T> = std::result::Result<T, RollupError>;

/// Residual vote for one contest in one jurisdiction.
///
/// `residual_votes` is signed: more choice votes than ballots (overvoting
/// contests, data errors) gives a negative residual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualRollup {
    pub residual_pct: f64,
    pub residual_votes: i64,
    pub total_choice_votes: u64,
    pub ballots_cast: u64,
}

impl ResidualRollup {
    /// Fails with `NoBallotsCast` when the rate is undefined, and with
    /// `Overflow` when either count does not fit a signed residual.
    pub fn new(total_choice_votes: u64, ballots_cast: u64) -> RollupResult<ResidualRollup> {
        if ballots_cast == 0 {
            return Err(RollupError::NoBallotsCast);
        }
        let overflow = RollupError::Overflow {
            total_choice_votes,
            ballots_cast,
        };
        let ballots = i64::try_from(ballots_cast).map_err(|_| overflow)?;
        let choices = i64::try_from(total_choice_votes).map_err(|_| overflow)?;
        let residual_votes = ballots.checked_sub(choices).ok_or(overflow)?;
        Ok(ResidualRollup {
            residual_pct: residual_votes as f64 * 100.0 / ballots_cast as f64,
            residual_votes,
            total_choice_votes,
            ballots_cast,
        })
    }

    /// Ascending by residual rate, then residual votes, choice votes and
    /// ballots cast.
    pub fn cmp_key(&self, other: &ResidualRollup) -> Ordering {
        self.residual_pct
            .total_cmp(&other.residual_pct)
            .then_with(|| self.residual_votes.cmp(&other.residual_votes))
            .then_with(|| self.total_choice_votes.cmp(&other.total_choice_votes))
            .then_with(|| self.ballots_cast.cmp(&other.ballots_cast))
    }
}

/// Sum of votes for one choice of one contest in one jurisdiction, across
/// every matching record (one per vote type in Clarify files).
pub fn sum_choice_votes(
    results: &[VoteResult],
    contest: &Contest,
    choice: &Choice,
    jurisdiction: &Jurisdiction,
) -> u64 {
    results
        .iter()
        .filter(|r| r.matches(contest, choice, jurisdiction))
        .fold(0, |total, r| total.saturating_add(r.votes))
}

/// Residual rollup of `contest` in `jurisdiction`.
pub fn rollup_contest(
    results: &[VoteResult],
    contest: &Contest,
    jurisdiction: &Jurisdiction,
) -> RollupResult<ResidualRollup> {
    let total_choice_votes = contest
        .choices
        .iter()
        .map(|choice| sum_choice_votes(results, contest, choice, jurisdiction))
        .fold(0, u64::saturating_add);
    ResidualRollup::new(total_choice_votes, jurisdiction.ballots_cast)
}

/// The same sums as [`sum_choice_votes`], precomputed in one pass over the
/// records so a full audit does not rescan them per (contest, choice,
/// jurisdiction).
#[derive(Debug, Default)]
pub struct VoteTotals {
    totals: HashMap<(String, String, String), u64>,
}

impl VoteTotals {
    pub fn from_results(results: &[VoteResult]) -> VoteTotals {
        let mut totals = HashMap::new();
        for result in results {
            if let (Some(choice), Some(jurisdiction)) = (&result.choice, &result.jurisdiction) {
                let total = totals
                    .entry((result.contest.clone(), choice.clone(), jurisdiction.clone()))
                    .or_insert(0u64);
                *total = total.saturating_add(result.votes);
            }
        }
        VoteTotals { totals }
    }

    pub fn choice_votes(&self, contest: &Contest, choice: &Choice, jurisdiction: &Jurisdiction) -> u64 {
        let key = (
            contest.key.clone(),
            choice.key.clone(),
            jurisdiction.name.clone(),
        );
        self.totals.get(&key).copied().unwrap_or(0)
    }

    pub fn rollup_contest(&self, contest: &Contest, jurisdiction: &Jurisdiction) -> RollupResult<ResidualRollup> {
        let total_choice_votes = contest
            .choices
            .iter()
            .map(|choice| self.choice_votes(contest, choice, jurisdiction))
            .fold(0, u64::saturating_add);
        ResidualRollup::new(total_choice_votes, jurisdiction.ballots_cast)
    }
}
