// Composite report and its text/json/markdown renderings

use crate::dimension::{Dimension, NormalizedDimension};
use crate::error::{EngineError, Result};
use crate::request::Profile;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// The engine's output for one request. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    pub target: String,
    pub profile: Profile,
    pub overall_score: u8,
    pub dimensions: BTreeMap<Dimension, NormalizedDimension>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CompositeReport {
    pub fn score(&self, dimension: Dimension) -> Option<u8> {
        self.dimensions.get(&dimension).and_then(|d| d.score)
    }

    /// Dimensions whose score came from the fallback policy
    pub fn degraded_dimensions(&self) -> Vec<Dimension> {
        self.dimensions
            .iter()
            .filter(|(_, d)| d.fallback_reason.is_some())
            .map(|(dimension, _)| *dimension)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| EngineError::UnknownFormat(s.to_string()))
    }
}

pub fn render_report(report: &CompositeReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

pub fn write_report(report: &CompositeReport, format: ReportFormat, path: &Path) -> Result<()> {
    let content = render_report(report, format)?;
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn generate_json_report(report: &CompositeReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn score_text(score: Option<u8>) -> String {
    match score {
        Some(score) => format!("{:>3}/100", score),
        None => "    n/a".to_string(),
    }
}

fn colorize_score(score: Option<u8>) -> String {
    let text = score_text(score);
    match score {
        Some(80..=100) => text.green().bold().to_string(),
        Some(50..=79) => text.yellow().to_string(),
        Some(_) => text.red().bold().to_string(),
        None => text.dimmed().to_string(),
    }
}

fn generate_text_report(report: &CompositeReport) -> String {
    let mut out = String::new();

    out.push_str("\n═══════════════════════════════════════════════════════════════════════════════\n");
    out.push_str("                            SITELENS REPORT\n");
    out.push_str("═══════════════════════════════════════════════════════════════════════════════\n\n");

    out.push_str(&format!("Target:  {}\n", report.target));
    out.push_str(&format!("Profile: {}\n", report.profile));
    out.push_str(&format!(
        "Overall: {}\n\n",
        colorize_score(Some(report.overall_score))
    ));

    out.push_str("Dimensions\n");
    out.push_str("───────────────────────────────────────────────────────────────────────────────\n");
    for (dimension, normalized) in &report.dimensions {
        out.push_str(&format!(
            "  {:<15} {}",
            dimension.as_str(),
            colorize_score(normalized.score)
        ));
        if let Some(ref reason) = normalized.fallback_reason {
            out.push_str(&format!("  {}", reason.dimmed()));
        }
        out.push('\n');
    }
    out.push('\n');

    for (title, items) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Recommendations", &report.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({})\n", title, items.len()));
        out.push_str("───────────────────────────────────────────────────────────────────────────────\n");
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("  {:>2}. {}\n", i + 1, item));
        }
        out.push('\n');
    }

    out.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
    out
}

fn generate_markdown_report(report: &CompositeReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SiteLens report: {}\n\n", report.target));
    md.push_str(&format!("- **Profile:** {}\n", report.profile));
    md.push_str(&format!("- **Overall score:** {}/100\n\n", report.overall_score));

    md.push_str("## Dimensions\n\n");
    md.push_str("| Dimension | Score | Note |\n");
    md.push_str("|-----------|-------|------|\n");
    for (dimension, normalized) in &report.dimensions {
        let score = normalized
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let note = normalized.fallback_reason.as_deref().unwrap_or("");
        md.push_str(&format!("| {} | {} | {} |\n", dimension.as_str(), score, note));
    }
    md.push('\n');

    for (title, items) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Recommendations", &report.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", title));
        for item in items {
            md.push_str(&format!("- {}\n", item));
        }
        md.push('\n');
    }

    md
}
