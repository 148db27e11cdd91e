//! CSV export of the cached result set.
//!
//! Exports are generated client-side from whatever the session currently holds; the header
//! row is the same column list the results table shows.
//!
//! Cells are written as the server sent them. Only terminal output goes through
//! [`crate::utils::sanitize_cell`], so for clean values a CSV row equals the on-screen row,
//! while a multi-line address or a field carrying escape codes keeps its raw text in the file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{LEAD_COLUMNS, Lead, LeadFilter, SearchQuery};

/// Write `leads` matching `filter` as CSV; returns the number of data rows written
pub fn write_csv<W: Write>(writer: W, leads: &[Lead], filter: LeadFilter) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(LEAD_COLUMNS).context("Failed to write CSV header")?;

    let mut rows = 0;
    for lead in leads.iter().filter(|lead| filter.matches(lead)) {
        csv_writer.write_record(lead.cells()).context("Failed to write CSV row")?;
        rows += 1;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(rows)
}

/// CSV export as an in-memory UTF-8 string
pub fn to_csv_string(leads: &[Lead], filter: LeadFilter) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, leads, filter)?;
    String::from_utf8(buffer).context("CSV output was not valid UTF-8")
}

/// Write the export to `path`, refusing to produce a file when there is nothing to export
pub fn export_to_file(path: &Path, leads: &[Lead], filter: LeadFilter) -> Result<usize> {
    if leads.is_empty() {
        bail!("No results to export - run a search first");
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let rows = write_csv(file, leads, filter)?;
    tracing::info!(path = %path.display(), rows, "exported leads");
    Ok(rows)
}

/// `<keyword>_<location>_leads.csv`, or `..._email_leads.csv` / `..._phone_leads.csv`
pub fn default_file_name(query: Option<&SearchQuery>, filter: LeadFilter) -> String {
    let stem = match query {
        Some(query) => format!("{}_{}", file_safe(&query.keyword), file_safe(&query.location)),
        None => "search".to_string(),
    };
    let suffix = match filter {
        LeadFilter::All => "leads",
        LeadFilter::WithEmail => "email_leads",
        LeadFilter::WithPhone => "phone_leads",
    };
    format!("{}_{}.csv", stem, suffix)
}

fn file_safe(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c.is_whitespace() || matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}
