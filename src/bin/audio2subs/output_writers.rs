use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use subalign::alignment::report::AlignmentReport;
use subalign::SilenceIntervals;

pub fn write_report_json(path: &Path, report: &AlignmentReport) -> Result<(), String> {
    let mut out = create_output(path, "report")?;
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|err| format!("Failed to serialize report JSON '{}': {err}", path.display()))?;
    writeln!(out)
        .and_then(|_| out.flush())
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))
}

/// One `begin_ms<TAB>end_ms` line per silence interval.
pub fn write_silence_listing<W: Write>(out: &mut W, silence: &SilenceIntervals) -> Result<(), String> {
    for interval in silence.as_slice() {
        writeln!(out, "{}\t{}", interval.begin_ms(), interval.end_ms())
            .map_err(|err| format!("Failed to write silence listing: {err}"))?;
    }
    out.flush()
        .map_err(|err| format!("Failed to write silence listing: {err}"))
}

fn create_output(path: &Path, what: &str) -> Result<BufWriter<File>, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create {what} output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    let file = File::create(path)
        .map_err(|err| format!("Failed to create {what} file '{}': {err}", path.display()))?;
    Ok(BufWriter::new(file))
}
