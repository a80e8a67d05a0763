//! CLI output formatting for the `image-tag` commands.
//!
//! # Output Format
//!
//! ## Batch
//!
//! ```text
//! 001 gallery poster.jpg
//!     default 400x300: generated /generated/poster-400x300-1a2b3c.jpg
//! 002 galery poster.jpg
//!     error: can't find the "galery" preset; define it in the config or use a WIDTHxHEIGHT pattern
//! 003 hero posters/hero.jpg
//!     default 800x600: cached /generated/posters/hero-800x600-0f0f0f.jpg
//!     small 400x300 (clamped): generated /generated/posters/hero-400x300-0f0f0f.jpg
//!
//! Images: 1 cached, 2 generated, 1 failed (4 total)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 gallery poster.jpg
//!     Source: poster.jpg
//!     default: 400x300
//!     Attributes: class="gal-img" alt="Poster"
//! 002 hero posters/hero.jpg
//!     Source: posters/hero.jpg
//!     default: 800xauto
//!     small: 400xauto (max-width: 600px)
//!
//! Checked 2 directives, 0 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::cache::{CacheStats, CacheStatus};
use crate::size::SizeRequest;
use crate::tag::{BatchReport, PreparedTag, Rendered, SourceOutcome, TagError};
use serde::Serialize;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `400x300`, `400xauto`, `native`.
fn size_label(request: &SizeRequest) -> String {
    let axis = |v: Option<u32>| v.map_or_else(|| "auto".to_string(), |n| n.to_string());
    match (request.width, request.height) {
        (None, None) => "native".to_string(),
        (w, h) => format!("{}x{}", axis(w), axis(h)),
    }
}

/// `default 400x300 (clamped): generated /generated/poster-400x300-1a2b3c.jpg`
fn outcome_line(outcome: &SourceOutcome) -> String {
    let clamped = if outcome.plan.was_clamped {
        " (clamped)"
    } else {
        ""
    };
    let status = match outcome.status {
        CacheStatus::Cached => "cached",
        CacheStatus::Generated => "generated",
    };
    format!(
        "{} {}x{}{}: {} {}",
        outcome.name,
        outcome.plan.target_width,
        outcome.plan.target_height,
        clamped,
        status,
        outcome.url
    )
}

// ============================================================================
// render
// ============================================================================

/// The markup of one rendered directive, line by line.
pub fn format_rendered(rendered: &Rendered) -> Vec<String> {
    rendered.markup.lines().map(str::to_string).collect()
}

pub fn print_rendered(rendered: &Rendered) {
    for line in format_rendered(rendered) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

pub fn format_batch_output(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in report.entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.directive.trim()));
        match &entry.result {
            Ok(rendered) => {
                for outcome in &rendered.outputs {
                    lines.push(format!("{}{}", indent(1), outcome_line(outcome)));
                }
            }
            Err(e) => lines.push(format!("{}error: {}", indent(1), e)),
        }
    }
    lines.push(String::new());
    lines.push(format_summary(&report.stats));
    lines
}

pub fn print_batch_output(report: &BatchReport) {
    for line in format_batch_output(report) {
        println!("{}", line);
    }
}

/// `Images: 3 cached, 2 generated (5 total)`
pub fn format_summary(stats: &CacheStats) -> String {
    format!("Images: {}", stats)
}

#[derive(Serialize)]
struct BatchJson<'a> {
    entries: Vec<EntryJson<'a>>,
    stats: &'a CacheStats,
}

#[derive(Serialize)]
struct EntryJson<'a> {
    directive: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    markup: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<&'a [SourceOutcome]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// The batch report as pretty-printed JSON.
pub fn format_batch_json(report: &BatchReport) -> serde_json::Result<String> {
    let entries = report
        .entries
        .iter()
        .map(|entry| match &entry.result {
            Ok(rendered) => EntryJson {
                directive: &entry.directive,
                markup: Some(rendered.markup.as_str()),
                outputs: Some(rendered.outputs.as_slice()),
                error: None,
            },
            Err(e) => EntryJson {
                directive: &entry.directive,
                markup: None,
                outputs: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    serde_json::to_string_pretty(&BatchJson {
        entries,
        stats: &report.stats,
    })
}

// ============================================================================
// check
// ============================================================================

pub fn format_check_output(checked: &[(String, Result<PreparedTag, TagError>)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (i, (raw, result)) in checked.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), raw.trim()));
        match result {
            Ok(prepared) => {
                lines.push(format!(
                    "{}Source: {}",
                    indent(1),
                    prepared.directive.source_path
                ));
                for source in &prepared.sources {
                    let media = source
                        .media
                        .as_deref()
                        .map(|m| format!(" {m}"))
                        .unwrap_or_default();
                    lines.push(format!(
                        "{}{}: {}{}",
                        indent(1),
                        source.name,
                        size_label(&source.request),
                        media
                    ));
                }
                if !prepared.attrs.is_empty() {
                    lines.push(format!(
                        "{}Attributes: {}",
                        indent(1),
                        prepared.attrs.render().trim_end()
                    ));
                }
            }
            Err(e) => {
                failed += 1;
                lines.push(format!("{}error: {}", indent(1), e));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Checked {} directives, {} failed",
        checked.len(),
        failed
    ));
    lines
}

pub fn print_check_output(checked: &[(String, Result<PreparedTag, TagError>)]) {
    for line in format_check_output(checked) {
        println!("{}", line);
    }
}
