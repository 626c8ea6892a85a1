//! Human-readable report.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use pwc_core::app::RunReport;
use pwc_core::domain::RunConfig;

/// Echo of the resolved settings, printed before any work starts.
pub fn write_settings<W: Write>(out: &mut W, config: &RunConfig) -> io::Result<()> {
    writeln!(out, "# of Partitions: {}", config.partitions)?;
    writeln!(
        out,
        "Crash Rate: {}%",
        config.failure.crash_probability_percent()
    )
}

pub fn write_report<W: Write>(
    out: &mut W,
    path: &Path,
    report: &RunReport,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "========= {} =========", path.display())?;
    writeln!(out, "Total Lines : {}", report.totals.lines())?;
    writeln!(out, "Total Words : {}", report.totals.words())?;
    writeln!(out, "Total Characters : {}", report.totals.chars())?;
    writeln!(
        out,
        "======== Took {:.3} seconds ========",
        elapsed.as_secs_f64()
    )
}

pub fn write_partitions<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    for p in &report.partitions {
        writeln!(
            out,
            "  partition {}: offset={} length={} attempts={}",
            p.partition.index,
            p.partition.offset,
            p.partition.length,
            p.attempt_count()
        )?;
    }
    Ok(())
}
