//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::Result;

use crate::scan::ScanProgress;
use crate::store::{ScanEntry, Verdict};

/// Write results as prettified JSON array.
pub fn write_json_pretty(results: &[ScanEntry], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write results as newline-delimited JSON (NDJSON).
pub fn write_ndjson(results: &[ScanEntry], mut w: impl Write) -> Result<()> {
    for item in results {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Keep only entries with the given verdict, preserving order.
pub fn filter_verdict(results: Vec<ScanEntry>, verdict: Verdict) -> Vec<ScanEntry> {
    results.into_iter().filter(|e| e.verdict == verdict).collect()
}

/// One-line human progress report, e.g. `scanned 50/120 (41.7%), +3 supported`.
pub fn progress_line(progress: &ScanProgress) -> String {
    format!(
        "scanned {}/{} ({:.1}%), +{} supported",
        progress.processed,
        progress.total,
        progress.percent(),
        progress.newly_found_supported
    )
}
