//! Clarify Audit
//!
//! Screens an election results file for counties whose turnout, or whose
//! residual vote rate in a statewide contest, is an outlier among their
//! peers. Outliers are found with the modified z-score, which is robust to
//! the very outliers it is looking for.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod formats;
pub mod logging;
pub mod model;
pub mod reports;
pub mod util;

pub use analysis::outliers::{classify_outliers, select_outliers, DEFAULT_THRESHOLD};
pub use analysis::rollup::{
    rollup_contest, sum_choice_votes, ResidualRollup, RollupError, VoteTotals,
};
pub use analysis::{audit_election, TurnoutRow};
pub use config::{AuditConfig, ReportFormat};
pub use model::election::{Choice, Contest, ElectionResults, Jurisdiction, VoteResult};
