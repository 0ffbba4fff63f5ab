//! Turnout and residual-vote audit of one election.
//!
//! The audit is a single pass: turnout rows for every jurisdiction, then one
//! residual-vote table per statewide contest, each screened with the
//! modified z-score detector in [`outliers`].

pub mod outliers;
pub mod rollup;

use crate::config::AuditConfig;
use crate::model::election::{Contest, ElectionResults, Jurisdiction};
use crate::reports::{
    AuditReport, ContestSection, ReportHeader, ResidualRow, SkipNote, SkipReason, SourceFile,
    TurnoutSection,
};
use itertools::Itertools;
use outliers::{modified_z_scores, select_outliers, OutlierError};
use rollup::{RollupError, VoteTotals};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Outlier detection failed: {0}")]
    Outlier(#[from] OutlierError),
    #[error("Residual vote for {contest} in {county}: {source}")]
    Rollup {
        contest: String,
        county: String,
        source: RollupError,
    },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Turnout of one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoutRow {
    pub turnout_pct: f64,
    pub ballots_cast: u64,
    pub total_voters: u64,
    pub county: String,
    /// Modified z-score of `turnout_pct` among all jurisdictions, when defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
}

impl TurnoutRow {
    /// `None` for a jurisdiction with no registered voters.
    pub fn new(jurisdiction: &Jurisdiction) -> Option<TurnoutRow> {
        if jurisdiction.total_voters == 0 {
            return None;
        }
        Some(TurnoutRow {
            turnout_pct: jurisdiction.ballots_cast as f64 * 100.0 / jurisdiction.total_voters as f64,
            ballots_cast: jurisdiction.ballots_cast,
            total_voters: jurisdiction.total_voters,
            county: jurisdiction.name.clone(),
            z_score: None,
        })
    }

    /// Ascending by turnout, then ballots, registered voters and name.
    pub fn cmp_key(&self, other: &TurnoutRow) -> Ordering {
        self.turnout_pct
            .total_cmp(&other.turnout_pct)
            .then_with(|| self.ballots_cast.cmp(&other.ballots_cast))
            .then_with(|| self.total_voters.cmp(&other.total_voters))
            .then_with(|| self.county.cmp(&other.county))
    }
}

/// Run the full audit over already-parsed election data.
pub fn audit_election(
    election: &ElectionResults,
    source: SourceFile,
    config: &AuditConfig,
) -> AnalysisResult<AuditReport> {
    log_contests(&election.contests);

    let turnout = turnout_outliers(&election.result_jurisdictions, config.threshold)?;
    info!("{} turnout outliers", turnout.outliers.len());

    let jurisdiction_count = election.result_jurisdictions.len();
    let totals = VoteTotals::from_results(&election.results);

    let mut contests = Vec::new();
    for contest in &election.contests {
        // Partial participation has no well-defined peer group.
        if !contest.is_statewide(jurisdiction_count) {
            debug!(
                "Skipping {} ({} of {} jurisdictions participating)",
                contest.label, contest.counties_participating, jurisdiction_count
            );
            continue;
        }

        let section = residual_outliers(contest, &election.result_jurisdictions, &totals, config)?;
        info!(
            "{}: {} residual vote outliers",
            contest.label,
            section.outliers.len()
        );
        contests.push(section);
    }

    Ok(AuditReport {
        header: ReportHeader {
            region: election.region.clone(),
            election_name: election.election_name.clone(),
            election_date: election.election_date.clone(),
            election_day: election.election_day(),
            timestamp: election.timestamp.clone(),
            source,
        },
        threshold: config.threshold,
        turnout,
        contests,
    })
}

fn log_contests(contests: &[Contest]) {
    for contest in contests
        .iter()
        .sorted_by(|a, b| {
            b.counties_participating
                .cmp(&a.counties_participating)
                .then_with(|| b.label.cmp(&a.label))
        })
    {
        info!("({}, {:?})", contest.counties_participating, contest.label);
    }
}

/// Turnout rows flagged as outliers, in ascending turnout order.
pub fn turnout_outliers(
    jurisdictions: &[Jurisdiction],
    threshold: f64,
) -> AnalysisResult<TurnoutSection> {
    let mut skipped = Vec::new();
    let mut rows = Vec::new();

    for jurisdiction in jurisdictions {
        match TurnoutRow::new(jurisdiction) {
            Some(row) => rows.push(row),
            None => {
                warn!(
                    "{} reports no registered voters; excluded from turnout analysis",
                    jurisdiction.name
                );
                skipped.push(SkipNote {
                    county: jurisdiction.name.clone(),
                    reason: SkipReason::NoRegisteredVoters,
                });
            }
        }
    }

    rows.sort_by(TurnoutRow::cmp_key);

    let values: Vec<f64> = rows.iter().map(|r| r.turnout_pct).collect();
    if let Some(scores) = modified_z_scores(&values)? {
        for (row, score) in rows.iter_mut().zip(scores) {
            row.z_score = Some(score);
        }
    }

    let outliers = select_outliers(&rows, &values, threshold)?;
    Ok(TurnoutSection { outliers, skipped })
}

/// Residual-vote outliers for one contest across `jurisdictions`.
pub fn residual_outliers(
    contest: &Contest,
    jurisdictions: &[Jurisdiction],
    totals: &VoteTotals,
    config: &AuditConfig,
) -> AnalysisResult<ContestSection> {
    let mut skipped = Vec::new();
    let mut rows = Vec::new();

    for jurisdiction in jurisdictions {
        match totals.rollup_contest(contest, jurisdiction) {
            Ok(rollup) => rows.push(ResidualRow {
                rollup,
                county: jurisdiction.name.clone(),
                z_score: None,
            }),
            Err(RollupError::NoBallotsCast) => {
                warn!(
                    "{} cast no ballots; excluded from residual analysis of {}",
                    jurisdiction.name, contest.label
                );
                skipped.push(SkipNote {
                    county: jurisdiction.name.clone(),
                    reason: SkipReason::NoBallotsCast,
                });
            }
            Err(source) => {
                return Err(AnalysisError::Rollup {
                    contest: contest.label.clone(),
                    county: jurisdiction.name.clone(),
                    source,
                })
            }
        }
    }

    rows.sort_by(|a, b| {
        a.rollup
            .cmp_key(&b.rollup)
            .then_with(|| a.county.cmp(&b.county))
    });

    let values: Vec<f64> = rows.iter().map(|r| r.rollup.residual_pct).collect();
    if let Some(scores) = modified_z_scores(&values)? {
        for (row, score) in rows.iter_mut().zip(scores) {
            row.z_score = Some(score);
        }
    }

    let mut outliers = select_outliers(&rows, &values, config.threshold)?;

    if config.flag_negative_residuals {
        let flagged: HashSet<&str> = outliers.iter().map(|r| r.county.as_str()).collect();
        outliers = rows
            .iter()
            .filter(|r| flagged.contains(r.county.as_str()) || r.rollup.residual_votes < 0)
            .cloned()
            .collect();
    }

    Ok(ContestSection {
        key: contest.key.clone(),
        label: contest.label.clone(),
        outliers,
        skipped,
    })
}
