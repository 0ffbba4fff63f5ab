mod audit;

pub use audit::{audit, audit_to};

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::formats::FormatError;
use crate::reports::ReportError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Cannot read results: {0}")]
    Format(#[from] FormatError),
    #[error("Audit failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Cannot write report: {0}")]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, CommandError>;
