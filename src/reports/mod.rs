use crate::analysis::rollup::ResidualRollup;
use crate::analysis::TurnoutRow;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

pub mod json;
pub mod text;

pub use json::JsonWriter;
pub use text::TextWriter;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Renders an [`AuditReport`] to an output stream.
pub trait ReportWriter {
    fn write_report(&self, report: &AuditReport, out: &mut dyn Write) -> ReportResult<()>;
}

/// Full audit of one results file.
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub header: ReportHeader,
    pub threshold: f64,
    pub turnout: TurnoutSection,
    /// One entry per statewide contest, in file order.
    pub contests: Vec<ContestSection>,
}

#[derive(Debug, Serialize)]
pub struct ReportHeader {
    pub region: String,
    #[serde(rename = "electionName")]
    pub election_name: String,
    #[serde(rename = "electionDate")]
    pub election_date: String,
    #[serde(rename = "electionDay", skip_serializing_if = "Option::is_none")]
    pub election_day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub source: SourceFile,
}

/// The results file the report was produced from.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl SourceFile {
    pub fn new(path: &str) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            sha1: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnoutSection {
    pub outliers: Vec<TurnoutRow>,
    pub skipped: Vec<SkipNote>,
}

#[derive(Debug, Serialize)]
pub struct ContestSection {
    pub key: String,
    pub label: String,
    pub outliers: Vec<ResidualRow>,
    pub skipped: Vec<SkipNote>,
}

/// Residual vote of one jurisdiction in one contest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualRow {
    #[serde(flatten)]
    pub rollup: ResidualRollup,
    pub county: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
}

/// A jurisdiction left out of a table because its rate is undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipNote {
    pub county: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoRegisteredVoters,
    NoBallotsCast,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoRegisteredVoters => write!(f, "no registered voters"),
            SkipReason::NoBallotsCast => write!(f, "no ballots cast"),
        }
    }
}
