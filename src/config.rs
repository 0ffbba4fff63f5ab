use crate::analysis::outliers::DEFAULT_THRESHOLD;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Outlier threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),
}

/// How the report is rendered on standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Everything one audit run needs, built once from the command line.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub input: PathBuf,
    /// Modified z-score above which a rate is an outlier.
    pub threshold: f64,
    /// Also flag every negative residual vote, whatever its z-score.
    pub flag_negative_residuals: bool,
    pub format: ReportFormat,
    pub log_level: LevelFilter,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            threshold: DEFAULT_THRESHOLD,
            flag_negative_residuals: false,
            format: ReportFormat::Text,
            log_level: LevelFilter::WARN,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Map a numeric debug level (DEBUG=10, INFO=20, WARNING=30, ERROR=40,
/// CRITICAL=50) onto a tracing filter. Messages at or above the level pass.
///
/// There is no CRITICAL level in tracing; 41-50 keep errors visible since
/// fatal failures are logged as errors.
pub fn level_filter(debuglevel: u32) -> LevelFilter {
    match debuglevel {
        0 => LevelFilter::TRACE,
        1..=10 => LevelFilter::DEBUG,
        11..=20 => LevelFilter::INFO,
        21..=30 => LevelFilter::WARN,
        31..=50 => LevelFilter::ERROR,
        _ => LevelFilter::OFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.threshold, 3.5);
        assert_eq!(config.log_level, LevelFilter::WARN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_validation() {
        let mut config = AuditConfig::default();
        config.threshold = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(0.0)));
        config.threshold = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_filter_matches_numeric_levels() {
        assert_eq!(level_filter(10), LevelFilter::DEBUG);
        assert_eq!(level_filter(20), LevelFilter::INFO);
        assert_eq!(level_filter(30), LevelFilter::WARN);
        assert_eq!(level_filter(40), LevelFilter::ERROR);
        assert_eq!(level_filter(50), LevelFilter::ERROR);
        assert_eq!(level_filter(15), LevelFilter::INFO);
        assert_eq!(level_filter(99), LevelFilter::OFF);
    }
}
