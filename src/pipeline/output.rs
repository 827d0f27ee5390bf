//! Serialization sink and the end-of-run console summary.

use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::types::ProjectRecord;

/// Write the aggregated records as a pretty-printed JSON array. An
/// unwritable path is fatal; a silent empty artifact would be worse than a
/// loud failure.
pub fn save_to_json(projects: &[ProjectRecord], path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(projects)?;
    fs::write(path, body)?;
    info!(count = projects.len(), path = %path.display(), "saved projects");
    Ok(())
}

/// Count occurrences and rank descending, ties broken alphabetically so
/// the report is stable run to run.
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Print the summary statistics block: totals, geocoding outcomes, funding,
/// and the state/agency leaderboards.
pub fn print_summary(projects: &[ProjectRecord]) {
    let successful_geocode = projects.iter().filter(|p| p.latitude.is_some()).count();
    let failed_geocode = projects.len() - successful_geocode;
    let total_funding: f64 = projects.iter().filter_map(|p| p.amount).sum();

    let states = ranked_counts(projects.iter().filter_map(|p| p.state.as_deref()));
    let agencies = ranked_counts(projects.iter().filter_map(|p| p.agency.as_deref()));

    println!("\nSUMMARY STATISTICS ({})", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("Total projects: {}", projects.len());
    println!("Successfully geocoded: {}", successful_geocode);
    println!("Failed geocoding: {}", failed_geocode);
    println!("Total funding: ${:.0}", total_funding);

    println!("\nProjects by state:");
    for (state, count) in states.iter().take(10) {
        println!("  {}: {}", state, count);
    }

    println!("\nTop agencies:");
    for (agency, count) in agencies.iter().take(5) {
        println!("  {}: {}", agency, count);
    }
}
