use super::{AuditReport, ReportResult, ReportWriter, SkipNote};
use colored::Colorize;
use std::io::Write;

/// Tab-separated tables, one per section.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextWriter {
    /// Embolden section headings. Only meaningful on a terminal.
    pub color: bool,
}

impl TextWriter {
    pub fn new(color: bool) -> TextWriter {
        TextWriter { color }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn write_skipped(out: &mut dyn Write, indent: &str, skipped: &[SkipNote]) -> ReportResult<()> {
    for note in skipped {
        writeln!(out, "{}Skipped {}: {}", indent, note.county, note.reason)?;
    }
    Ok(())
}

impl ReportWriter for TextWriter {
    fn write_report(&self, report: &AuditReport, out: &mut dyn Write) -> ReportResult<()> {
        let header = &report.header;
        writeln!(
            out,
            "{}",
            self.heading(&format!(
                "Report for {} {} {}",
                header.region, header.election_name, header.election_date
            ))
        )?;
        writeln!(out, "{}", header.source.path)?;
        writeln!(out)?;

        writeln!(out, "{}", self.heading("Outliers for turnout percentage"))?;
        writeln!(out, "% Turnout\tBallots\tRegistered\tCounty")?;
        for row in &report.turnout.outliers {
            writeln!(
                out,
                "{:.1}%\t{}\t{}\t{}",
                row.turnout_pct, row.ballots_cast, row.total_voters, row.county
            )?;
        }
        write_skipped(out, "", &report.turnout.skipped)?;

        writeln!(out)?;
        writeln!(
            out,
            "{}",
            self.heading("Outliers for residual vote within each state-wide contest")
        )?;

        for section in &report.contests {
            writeln!(out, "{}:", section.label)?;
            writeln!(out, "\tResidual%\tResidual\tVotes\tBallots\tCounty")?;
            for row in &section.outliers {
                let r = &row.rollup;
                writeln!(
                    out,
                    "\t{:.1}%\t{}\t{}\t{}\t{}",
                    r.residual_pct, r.residual_votes, r.total_choice_votes, r.ballots_cast, row.county
                )?;
            }
            write_skipped(out, "\t", &section.skipped)?;
        }

        Ok(())
    }
}
