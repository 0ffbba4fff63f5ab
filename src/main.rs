use clap::{CommandFactory, Parser};
use clarify_audit::analysis::outliers::DEFAULT_THRESHOLD;
use clarify_audit::config::{level_filter, AuditConfig, ReportFormat};
use clarify_audit::{commands, logging};
use std::path::PathBuf;
use tracing::{debug, error};

/// Process a Clarify results file and identify outliers for residual vote
/// rate and turnout.
#[derive(Parser, Debug)]
#[clap(
    name = "clarify-audit",
    version,
    about,
    override_usage = "clarify-audit [OPTIONS] detail.xml"
)]
struct Opts {
    /// Set logging level to debuglevel: DEBUG=10, INFO=20, WARNING=30 (the
    /// default), ERROR=40, CRITICAL=50
    #[clap(short = 'd', long = "debuglevel", value_name = "LEVEL", default_value_t = 30)]
    debuglevel: u32,
    /// Modified z-score above which a rate is reported as an outlier
    #[clap(short = 't', long, value_name = "Z", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Also report every county with more contest votes than ballots cast
    #[clap(long)]
    flag_negative_residuals: bool,
    /// Report format
    #[clap(long, value_enum, default_value = "text")]
    format: ReportFormat,
    /// Clarify detail.xml or detail.zip, or a JSON snapshot
    #[clap(value_name = "RESULTS_FILE", value_parser)]
    files: Vec<PathBuf>,
}

fn main() {
    let opts = Opts::parse();

    let mut config = AuditConfig {
        input: PathBuf::new(),
        threshold: opts.threshold,
        flag_negative_residuals: opts.flag_negative_residuals,
        format: opts.format,
        log_level: level_filter(opts.debuglevel),
    };

    logging::init(config.log_level);
    debug!("options: {:?}", opts);

    if opts.files.len() != 1 {
        error!(
            "Must specify one results file, got {}: {:?}",
            opts.files.len(),
            opts.files
        );
        let _ = Opts::command().print_help();
        std::process::exit(1);
    }
    config.input = opts.files[0].clone();

    if let Err(e) = commands::audit(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
