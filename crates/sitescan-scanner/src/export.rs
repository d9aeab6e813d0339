//! CSV rendering of finished results.

use crate::error::Result;
use sitescan_core::ScanResult;
use std::io;

/// Render results as CSV: a header row, then one row per result in the
/// order given. Rows are separated by `\n` with no trailing newline.
pub fn to_csv(results: &[ScanResult], keyword: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    let contains = format!("Contains \"{keyword}\"");
    writer.write_record(["URL", contains.as_str(), "Method", "Error"])?;

    for result in results {
        let verdict = result.result.to_string();
        let method = result
            .method
            .map(|method| method.to_string())
            .unwrap_or_default();
        let error = result.error.as_deref().unwrap_or_default();

        writer.write_record([result.url.as_str(), verdict.as_str(), method.as_str(), error])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let mut out = String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
