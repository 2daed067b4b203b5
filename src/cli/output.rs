//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use alumni_hub::views::preview;
use alumni_hub::{Batchmate, DashboardStats, Report};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let cut: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

fn print_table(rows: &[Batchmate]) {
    println!(
        "{:<8} {:<16} {:<28} {:<12} {:<16} WORKPLACE",
        "ID", "CALLING NAME", "FULL NAME", "FIELD", "COUNTRY"
    );
    println!("{}", "-".repeat(100));

    for record in rows {
        println!(
            "{:<8} {:<16} {:<28} {:<12} {:<16} {}",
            truncate(record.key(), 8),
            truncate(&record.calling_name, 16),
            truncate(&record.full_name, 28),
            record.field,
            truncate(record.country.as_deref().unwrap_or("-"), 16),
            record.working_place.as_deref().unwrap_or("-"),
        );
    }
}

/// Print search results.
pub fn print_search_results(results: &[Batchmate], limit: usize, json: bool) {
    let page = preview(results, limit);
    if json {
        print_json(&page);
        return;
    }

    if results.is_empty() {
        println!("No batchmates found.");
        return;
    }

    print_table(&page.rows);
    match page.summary() {
        Some(summary) => println!("\n{}", summary),
        None => println!("\nTotal: {} batchmates", page.total),
    }
}

/// Print dashboard statistics.
pub fn print_stats(stats: &DashboardStats, json: bool) {
    if json {
        print_json(stats);
        return;
    }

    println!("Directory Statistics");
    println!("{}", "=".repeat(40));
    println!("Alumni:       {}", stats.total_alumni);
    println!("Countries:    {}", stats.countries);
    println!("Workplaces:   {}", stats.workplaces);

    println!("\nBy field");
    let max = stats.max_field_count().max(1);
    for count in &stats.field_counts {
        let bar = "#".repeat(count.count * 30 / max);
        println!("  {:<12} {:>5}  {}", count.field, count.count, bar);
    }

    if !stats.recent.is_empty() {
        println!("\nRecently added");
        for recent in &stats.recent {
            println!(
                "  {} ({}) {} - {}",
                recent.full_name,
                recent.calling_name,
                recent.field,
                recent.created_at.format("%Y-%m-%d")
            );
        }
    }
}

/// Print a report.
pub fn print_report(report: &Report, preview_limit: usize, json: bool) {
    if json {
        print_json(report);
        return;
    }

    println!("{}", report.title);
    println!("{}", "=".repeat(report.title.len().max(20)));

    let page = report.preview(preview_limit);
    if page.rows.is_empty() {
        println!("No records match this report.");
    } else {
        print_table(&page.rows);
        if let Some(summary) = page.summary() {
            println!("{}", summary);
        }
    }

    println!("\nRecords by field");
    for count in report.field_stats.iter().filter(|c| c.count > 0) {
        println!("  {:<12} {:>5}", count.field, count.count);
    }

    if !report.country_stats.is_empty() {
        println!("\nTop countries");
        for country in &report.country_stats {
            println!("  {:<24} {:>5}", country.country, country.count);
        }
    }
}

/// Print a password hash for the config file.
pub fn print_hash(hash: &str, json: bool) {
    if json {
        print_json(&serde_json::json!({ "password_sha256": hash }));
    } else {
        println!("password_sha256 = \"{}\"", hash);
    }
}
