//! Report rendering.
//!
//! Turns a finalized [`SummaryReport`] into structured text, Markdown, or
//! JSON. Every renderer is a pure function of the report; writing to disk is
//! kept separate in [`write_report`].

use crate::models::{ExecutionLog, ReportMetadata, StageResult, SummaryReport};
use crate::report::ReportError;
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str =
    "══════════════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str =
    "──────────────────────────────────────────────────────────────────────";

/// Output format for a rendered report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured plain text
    Text,
    /// Markdown document
    Markdown,
    /// Pretty-printed JSON (default)
    #[default]
    Json,
}

impl SummaryReport {
    /// Render this report in the given format.
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(generate_text_report(self)),
            ReportFormat::Markdown => Ok(generate_markdown_report(self)),
            ReportFormat::Json => generate_json_report(self),
        }
    }
}

/// Generate the structured plain-text rendering.
pub fn generate_text_report(report: &SummaryReport) -> String {
    let mut output = String::new();
    let metadata = report.metadata();

    output.push_str(HEAVY_RULE);
    output.push('\n');
    output.push_str(&format!("{} SUMMARY REPORT\n", metadata.pipeline.to_uppercase()));
    output.push_str(HEAVY_RULE);
    output.push('\n');
    output.push_str(&format_metadata_block(metadata));

    for (index, (name, result)) in report.stages().iter().enumerate() {
        output.push('\n');
        output.push_str(LIGHT_RULE);
        output.push('\n');
        output.push_str(&format!("{}. {}\n", index + 1, section_title(name)));
        output.push_str(LIGHT_RULE);
        output.push('\n');
        output.push_str(&format_stage_fields(result));
    }

    if !report.execution_log().is_empty() {
        output.push('\n');
        output.push_str(LIGHT_RULE);
        output.push('\n');
        output.push_str("EXECUTION LOG\n");
        output.push_str(LIGHT_RULE);
        output.push('\n');
        output.push_str(&format_log_lines(report.execution_log()));
    }

    output.push('\n');
    output.push_str(HEAVY_RULE);
    output.push('\n');

    output
}

fn format_metadata_block(metadata: &ReportMetadata) -> String {
    let mut block = String::new();

    block.push_str(&format!("Pipeline:     {}\n", metadata.pipeline));
    block.push_str(&format!("Run ID:       {}\n", metadata.run_id));
    block.push_str(&format!("Started:      {}\n", timestamp(&metadata.started_at)));
    block.push_str(&format!("Finished:     {}\n", timestamp(&metadata.finished_at)));
    block.push_str(&format!("Elapsed:      {}\n", format_elapsed(metadata.elapsed_ms)));
    block.push_str(&format!("Stages:       {}\n", metadata.stage_count));
    block.push_str(&format!("Log Entries:  {}\n", metadata.log_entries));

    block
}

fn format_stage_fields(result: &StageResult) -> String {
    let mut out = String::new();
    if result.is_empty() {
        out.push_str("(no fields)\n");
        return out;
    }
    for (key, value) in result.fields() {
        write_field(&mut out, key, value, 0);
    }
    out
}

fn write_field(out: &mut String, key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(fields) if !fields.is_empty() => {
            out.push_str(&format!("{}{}:\n", indent, key));
            for (child_key, child) in fields {
                write_field(out, child_key, child, depth + 1);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            out.push_str(&format!("{}{}:\n", indent, key));
            for item in items {
                write_item(out, item, depth + 1);
            }
        }
        scalar => out.push_str(&format!("{}{}: {}\n", indent, key, scalar_text(scalar))),
    }
}

fn write_item(out: &mut String, item: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match item {
        Value::Object(fields) if !fields.is_empty() => {
            // First field shares the bullet line, the rest align under it.
            let mut first = true;
            for (key, value) in fields {
                if first {
                    let mut line = String::new();
                    write_field(&mut line, key, value, depth + 1);
                    out.push_str(&format!("{}- {}", indent, line.trim_start()));
                    first = false;
                } else {
                    write_field(out, key, value, depth + 1);
                }
            }
        }
        Value::Array(items) if !items.is_empty() => {
            out.push_str(&format!("{}-\n", indent));
            for nested in items {
                write_item(out, nested, depth + 1);
            }
        }
        scalar => out.push_str(&format!("{}- {}\n", indent, scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
        other => other.to_string(),
    }
}

fn format_log_lines(log: &ExecutionLog) -> String {
    let mut lines = String::new();
    for entry in log.entries() {
        lines.push_str(&format!(
            "{} [{}] {}\n",
            timestamp(&entry.timestamp),
            entry.category,
            entry.message.trim()
        ));
    }
    lines
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SummaryReport) -> String {
    let mut output = String::new();

    output.push_str("# Deploysim Report\n\n");
    output.push_str(&generate_metadata_section(report.metadata()));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_stages_section(report));
    output.push_str(&generate_log_section(report.execution_log()));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Pipeline:** `{}`\n", metadata.pipeline));
    section.push_str(&format!("- **Run ID:** `{}`\n", metadata.run_id));
    section.push_str(&format!(
        "- **Started:** {}\n",
        metadata.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Finished:** {}\n",
        metadata.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Elapsed:** {}\n",
        format_elapsed(metadata.elapsed_ms)
    ));
    section.push_str(&format!("- **Stages:** {}\n", metadata.stage_count));
    section.push_str(&format!("- **Log Entries:** {}\n", metadata.log_entries));
    section.push('\n');

    section
}

fn generate_table_of_contents(report: &SummaryReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Stages](#stages)\n");

    for name in report.stages().names() {
        toc.push_str(&format!("  - [{}](#{})\n", name, anchor(name)));
    }

    if !report.execution_log().is_empty() {
        toc.push_str("- [Execution Log](#execution-log)\n");
    }

    toc.push('\n');

    toc
}

fn generate_stages_section(report: &SummaryReport) -> String {
    let mut section = String::new();

    section.push_str("## Stages\n\n");

    if report.stages().is_empty() {
        section.push_str("No stages were recorded.\n\n");
        return section;
    }

    for (name, result) in report.stages().iter() {
        section.push_str(&format!("### {} {{#{}}}\n\n", name, anchor(name)));
        section.push_str(&format!("*Fields: {}*\n\n", result.len()));
        section.push_str("```json\n");
        // A StageResult is always an object of JSON values, which cannot fail to encode.
        let body = serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string());
        section.push_str(&body);
        section.push_str("\n```\n\n");
    }

    section
}

fn generate_log_section(log: &ExecutionLog) -> String {
    if log.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Execution Log\n\n");
    section.push_str("| Time | Category | Message |\n");
    section.push_str("|:---|:---:|:---|\n");

    for entry in log.entries() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.category,
            entry.message.trim().replace('|', "\\|")
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by deploysim. All resources are simulated.*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SummaryReport) -> Result<String, ReportError> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Parse a report previously produced by [`generate_json_report`].
///
/// The metadata counts must agree with the stages and log actually present.
pub fn parse_json_report(json: &str) -> Result<SummaryReport, ReportError> {
    let report: SummaryReport = serde_json::from_str(json)?;

    let metadata = report.metadata();
    if metadata.stage_count != report.stages().len() {
        return Err(ReportError::Serialization(format!(
            "metadata claims {} stages but report has {}",
            metadata.stage_count,
            report.stages().len()
        )));
    }
    if metadata.log_entries != report.execution_log().len() {
        return Err(ReportError::Serialization(format!(
            "metadata claims {} log entries but report has {}",
            metadata.log_entries,
            report.execution_log().len()
        )));
    }

    Ok(report)
}

/// Render the report and write it to `path`.
pub fn write_report(report: &SummaryReport, format: ReportFormat, path: &Path) -> Result<()> {
    let content = report.render(format)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

fn section_title(name: &str) -> String {
    name.replace(['_', '-'], " ").to_uppercase()
}

fn anchor(name: &str) -> String {
    name.replace(['_', ' ', '.'], "-").to_lowercase()
}

fn timestamp(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_elapsed(elapsed_ms: u64) -> String {
    format!("{:.2} seconds", elapsed_ms as f64 / 1000.0)
}
