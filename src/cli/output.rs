use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::models::{AccountState, LEAD_COLUMNS, Lead, UsageState};
use crate::utils::sanitize_cell;

/// Results table for one page of leads; remote text is sanitized before printing
pub fn lead_table(rows: &[&Lead]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(LEAD_COLUMNS.iter().map(|c| Cell::new(c).add_attribute(Attribute::Bold)));

    for lead in rows {
        table.add_row(lead.cells().iter().map(|cell| sanitize_cell(cell)));
    }
    table
}

pub fn print_leads(out: &mut dyn Write, rows: &[&Lead]) -> Result<()> {
    writeln!(out, "{}", lead_table(rows))?;
    Ok(())
}

pub fn print_account(out: &mut dyn Write, account: &AccountState, show_full_key: bool) -> Result<()> {
    let premium = if account.premium() { " (premium)".green().to_string() } else { String::new() };
    writeln!(out, "Tier: {}{}", account.tier, premium)?;
    let key = if show_full_key { account.api_key.clone() } else { account.masked_key() };
    writeln!(out, "API key: {}", key)?;
    Ok(())
}

pub fn print_usage(out: &mut dyn Write, usage: &UsageState) -> Result<()> {
    writeln!(
        out,
        "Daily usage: {}/{} ({}%){}",
        usage.daily,
        usage.daily_limit,
        usage.daily_percent(),
        reset_suffix(usage.reset_daily.as_ref())
    )?;
    writeln!(
        out,
        "Monthly usage: {}/{} ({}%){}",
        usage.monthly,
        usage.monthly_limit,
        usage.monthly_percent(),
        reset_suffix(usage.reset_monthly.as_ref())
    )?;
    Ok(())
}

fn reset_suffix(reset: Option<&DateTime<Utc>>) -> String {
    reset.map(|at| format!(", resets {}", at.format("%Y-%m-%d %H:%M UTC"))).unwrap_or_default()
}
