//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Every entity (template, item) leads with its positional index and its
//! identity; file paths follow as secondary context, either after `→` or on an
//! indented `Source:` line.
//!
//! # Output Format
//!
//! ## Export
//!
//! ```text
//! iOS ← logo.png (1024x1024, 22 items)
//!     001 20x20 → output/iOS/Icon-20.png
//!     002 0x20 failed: Invalid dimensions 0x20
//! Exported 21 of 22 items to output/iOS
//! ```
//!
//! ## Templates
//!
//! ```text
//! 001 Android (6 items)
//!     Source: templates/android.xml
//! 002 (broken.xml)
//!     Error: Template does not match schema: ...
//! ```
//!
//! ## Show
//!
//! ```text
//! iOS (22 items)
//!     Output: iOS/
//!     Fallback: Icon-%w
//!     001 20x20 → Icon-20
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::export::{ExportEvent, ExportReport};
use crate::template::{ExportTemplate, StoredTemplate};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn item_count(n: usize) -> String {
    match n {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    }
}

/// `001 48x48` for the zero-based template `index`.
fn item_label(index: usize, width: u32, height: u32) -> String {
    format!("{} {}x{}", format_index(index + 1), width, height)
}

// ============================================================================
// Export
// ============================================================================

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started {
            template,
            source,
            width,
            height,
            item_count: count,
        } => vec![format!(
            "{} \u{2190} {} ({}x{}, {})",
            template,
            file_name(source),
            width,
            height,
            item_count(*count)
        )],
        ExportEvent::ItemWritten {
            index,
            width,
            height,
            path,
        } => vec![format!(
            "{}{} \u{2192} {}",
            indent(1),
            item_label(*index, *width, *height),
            path.display()
        )],
        ExportEvent::ItemFailed {
            index,
            width,
            height,
            message,
        } => vec![format!(
            "{}{} failed: {}",
            indent(1),
            item_label(*index, *width, *height),
            message
        )],
    }
}

/// Summary printed after the progress events.
pub fn format_export_summary(report: &ExportReport) -> Vec<String> {
    let total = report.items.len();
    let ok = report.succeeded();
    let mut lines = vec![format!(
        "Exported {} of {} to {}",
        ok,
        item_count(total),
        report.output_dir.display()
    )];
    if ok < total {
        lines.push(format!("{} failed:", item_count(total - ok)));
        for item in report.failures() {
            if let Err(e) = &item.result {
                lines.push(format!(
                    "{}{}: {}",
                    indent(1),
                    item_label(item.index, item.width, item.height),
                    e
                ));
            }
        }
    }
    lines
}

pub fn print_export_summary(report: &ExportReport) {
    for line in format_export_summary(report) {
        println!("{}", line);
    }
}

/// Machine-readable export report for `--json`.
pub fn export_report_json(report: &ExportReport) -> serde_json::Value {
    let items: Vec<serde_json::Value> = report
        .items
        .iter()
        .map(|item| {
            let mut entry = serde_json::json!({
                "index": item.index,
                "width": item.width,
                "height": item.height,
                "name": item.name,
            });
            match &item.result {
                Ok(path) => {
                    entry["path"] = serde_json::json!(path);
                }
                Err(e) => {
                    entry["error"] = serde_json::json!({
                        "kind": e.kind(),
                        "message": e.to_string(),
                    });
                }
            }
            entry
        })
        .collect();

    serde_json::json!({
        "template": report.template,
        "source": report.source,
        "output_dir": report.output_dir,
        "succeeded": report.succeeded(),
        "failed": report.items.len() - report.succeeded(),
        "items": items,
    })
}

// ============================================================================
// Templates
// ============================================================================

/// Format the `templates` listing: one header per file, broken ones included.
pub fn format_template_list(templates: &[StoredTemplate], dir: &Path) -> Vec<String> {
    if templates.is_empty() {
        return vec![format!(
            "No templates in {} (run `icolib gen-templates`)",
            dir.display()
        )];
    }
    let mut lines = Vec::new();
    for (i, stored) in templates.iter().enumerate() {
        match &stored.template {
            Ok(t) => {
                lines.push(format!(
                    "{} {} ({})",
                    format_index(i + 1),
                    t.name,
                    item_count(t.items().len())
                ));
                lines.push(format!("{}Source: {}", indent(1), stored.path.display()));
            }
            Err(e) => {
                lines.push(format!("{} ({})", format_index(i + 1), file_name(&stored.path)));
                lines.push(format!("{}Error: {}", indent(1), e));
            }
        }
    }
    lines
}

pub fn print_template_list(templates: &[StoredTemplate], dir: &Path) {
    for line in format_template_list(templates, dir) {
        println!("{}", line);
    }
}

/// Format one template with every item's resolved file name.
pub fn format_template(template: &ExportTemplate) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        template.name,
        item_count(template.items().len())
    )];
    lines.push(format!("{}Output: {}/", indent(1), template.output_directory));
    if !template.fallback_naming_pattern.is_empty() {
        lines.push(format!(
            "{}Fallback: {}",
            indent(1),
            template.fallback_naming_pattern
        ));
    }
    for (i, item) in template.items().iter().enumerate() {
        let name = template
            .resolve_name(item)
            .unwrap_or_else(|_| "(no naming pattern)".to_string());
        lines.push(format!(
            "{}{} \u{2192} {}",
            indent(1),
            item_label(i, item.width, item.height),
            name
        ));
    }
    lines
}

pub fn print_template(template: &ExportTemplate) {
    for line in format_template(template) {
        println!("{}", line);
    }
}

/// Format the `gen-templates` result.
pub fn format_generated_templates(saved: &[(String, PathBuf)]) -> Vec<String> {
    saved
        .iter()
        .map(|(name, path)| format!("{} \u{2192} {}", name, path.display()))
        .collect()
}

pub fn print_generated_templates(saved: &[(String, PathBuf)]) {
    for line in format_generated_templates(saved) {
        println!("{}", line);
    }
}

// ============================================================================
// Single-image operations
// ============================================================================

pub fn format_operation_output(description: &str, source: &Path, written: &Path) -> Vec<String> {
    vec![format!(
        "{}: {} \u{2192} {}",
        description,
        file_name(source),
        written.display()
    )]
}

pub fn print_operation_output(description: &str, source: &Path, written: &Path) {
    for line in format_operation_output(description, source, written) {
        println!("{}", line);
    }
}
