//! Output formatting for logweave results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for editor integrations and scripts

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{Located, Resolution};
use crate::inserted::FileScan;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON structure for `insert`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct JsonInsert {
    pub version: String,
    pub file: String,
    pub category: Option<String>,
    /// 0-indexed line of the new statement.
    pub insertion_line: usize,
    pub statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_region: Option<JsonEditRegion>,
}

/// Replaced byte range of a function rewrite.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct JsonEditRegion {
    pub start_offset: usize,
    pub end_offset_in_original: usize,
    pub end_offset_in_new: usize,
}

/// JSON structure for `resolve`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct JsonResolve {
    pub version: String,
    pub file: String,
    pub category: Option<String>,
    pub insertion_line: usize,
    pub needs_transform: bool,
}

/// JSON structure for `list`, `clean` and `correct`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct JsonScan {
    pub version: String,
    pub path: String,
    pub files_with_logs: usize,
    pub statements: Vec<JsonStatement>,
}

/// One previously inserted statement.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct JsonStatement {
    pub file: String,
    /// 1-based line, as shown to users.
    pub line: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_line: Option<usize>,
    pub stale: bool,
}

pub fn insert_to_json(file: &str, resolution: &Resolution) -> JsonInsert {
    JsonInsert {
        version: env!("CARGO_PKG_VERSION").to_string(),
        file: file.to_string(),
        category: resolution.category.map(|c| c.as_str().to_string()),
        insertion_line: resolution.insertion_line,
        statement: resolution.statement.clone(),
        transformed_text: resolution.transformed_text().map(str::to_string),
        edit_region: resolution.edit_region().map(|r| JsonEditRegion {
            start_offset: r.start_offset,
            end_offset_in_original: r.end_offset_in_original,
            end_offset_in_new: r.end_offset_in_new,
        }),
    }
}

pub fn scan_to_json(path: &str, scans: &[FileScan]) -> JsonScan {
    let statements = scans
        .iter()
        .flat_map(|scan| {
            let file = scan.path.to_string_lossy().to_string();
            scan.logs.iter().map(move |log| JsonStatement {
                file: file.clone(),
                line: log.line + 1,
                message: log.message.clone(),
                claimed_line: log.claimed_line,
                stale: log.is_stale(),
            })
        })
        .collect();

    JsonScan {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_with_logs: scans.len(),
        statements,
    }
}

/// Write an `insert` result in JSON format.
pub fn write_insert_json(file: &str, resolution: &Resolution) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&insert_to_json(file, resolution))?;
    println!("{}", json);
    Ok(())
}

/// Write a `resolve` result in JSON format.
pub fn write_resolve_json(file: &str, located: &Located) -> anyhow::Result<()> {
    let report = JsonResolve {
        version: env!("CARGO_PKG_VERSION").to_string(),
        file: file.to_string(),
        category: located.category.map(|c| c.as_str().to_string()),
        insertion_line: located.insertion_line,
        needs_transform: located.needs_transform,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write scan results in JSON format.
pub fn write_scan_json(path: &str, scans: &[FileScan]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&scan_to_json(path, scans))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header() {
    println!();
    print!("  ");
    print!("{}", "logweave".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

fn category_label(category: Option<crate::classify::Category>) -> ColoredString {
    match category {
        Some(c) => c.as_str().green(),
        None => "unmatched (default placement)".yellow(),
    }
}

/// Write an `insert` result for humans.
pub fn write_insert_pretty(file: &str, resolution: &Resolution, written: bool) {
    write_header();
    print!("  {}", "File:      ".dimmed());
    println!("{}", file);
    print!("  {}", "Category:  ".dimmed());
    println!("{}", category_label(resolution.category));
    print!("  {}", "Line:      ".dimmed());
    println!("{}", resolution.insertion_line + 1);
    if resolution.transformed_text().is_some() {
        print!("  {}", "Rewrite:   ".dimmed());
        println!("{}", "function body expanded".yellow());
    }
    println!();
    println!("  {}", resolution.statement.bold());
    println!();
    if written {
        println!("  {}", "✓ file updated".green());
    } else {
        println!("  {}", "dry run, pass --write to apply".dimmed());
    }
    println!();
}

/// Write a `resolve` result for humans.
pub fn write_resolve_pretty(file: &str, located: &Located) {
    write_header();
    print!("  {}", "File:      ".dimmed());
    println!("{}", file);
    print!("  {}", "Category:  ".dimmed());
    println!("{}", category_label(located.category));
    print!("  {}", "Line:      ".dimmed());
    print!("{}", located.insertion_line + 1);
    if located.needs_transform {
        print!("  {}", "(after rewriting the function body)".yellow());
    }
    println!();
    println!();
}

/// Write scan results for humans. `action` describes what happened to the
/// statements ("found", "removed", "corrected").
pub fn write_scan_pretty(path: &str, scans: &[FileScan], action: &str, count: usize) {
    write_header();
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    println!();

    for scan in scans {
        println!("  {}", display_path(&scan.path).bold());
        for log in &scan.logs {
            let marker = if log.is_stale() {
                "stale".yellow()
            } else {
                "ok".green()
            };
            println!(
                "    {}  {}  {}",
                format!("{:>5}", log.line + 1).dimmed(),
                marker,
                log.message
            );
        }
        println!();
    }

    if count == 0 {
        println!("  {}", format!("No statements {}", action).dimmed());
    } else {
        println!(
            "  {}",
            format!("{} statement(s) {} in {} file(s)", count, action, scans.len()).green()
        );
    }
    println!();
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
