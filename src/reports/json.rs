use super::{AuditReport, ReportResult, ReportWriter};
use std::io::Write;

/// The whole report as one pretty-printed JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl ReportWriter for JsonWriter {
    fn write_report(&self, report: &AuditReport, out: &mut dyn Write) -> ReportResult<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        Ok(())
    }
}
