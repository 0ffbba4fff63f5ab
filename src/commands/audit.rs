use super::Result;
use crate::analysis::audit_election;
use crate::config::{AuditConfig, ReportFormat};
use crate::formats::read_election;
use crate::reports::{JsonWriter, ReportWriter, SourceFile, TextWriter};
use crate::util::file_sha1;
use instant::Instant;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Audit `config.input` and print the report on stdout.
pub fn audit(config: &AuditConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    audit_to(config, &mut out)
}

/// Audit `config.input` and write the report to `out`.
pub fn audit_to(config: &AuditConfig, out: &mut dyn Write) -> Result<()> {
    config.validate()?;
    let started = Instant::now();

    info!("Reading {}", config.input.display());
    let election = read_election(&config.input)?;

    let sha1 = match file_sha1(&config.input) {
        Ok(digest) => {
            info!("{} sha1 {}", config.input.display(), digest);
            Some(digest)
        }
        Err(e) => {
            warn!("Cannot fingerprint {}: {}", config.input.display(), e);
            None
        }
    };
    let source = SourceFile {
        path: config.input.display().to_string(),
        sha1,
    };

    let report = audit_election(&election, source, config)?;

    // Colored turns itself off when stdout is not a terminal.
    let writer: Box<dyn ReportWriter> = match config.format {
        ReportFormat::Text => Box::new(TextWriter::new(true)),
        ReportFormat::Json => Box::new(JsonWriter),
    };
    writer.write_report(&report, out)?;
    out.flush().map_err(crate::reports::ReportError::from)?;

    debug!(
        "Audit of {} finished in {:.2} seconds",
        config.input.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
