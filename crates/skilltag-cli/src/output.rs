//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use skilltag_domain::{ExtractedSkill, Paper};
use skilltag_extractor::ExtractionReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const TITLE_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of papers.
    pub fn format_papers(&self, papers: &[Paper]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = papers.iter().map(paper_json).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => Ok(self.format_papers_table(papers)),
            OutputFormat::Quiet => Ok(papers
                .iter()
                .filter_map(|p| p.id.map(|id| id.to_string()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_papers_table(&self, papers: &[Paper]) -> String {
        if papers.is_empty() {
            return self.colorize("No papers found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Authors", "Year", "DOI"]);

        for paper in papers {
            builder.push_record([
                paper.id.map(|id| id.to_string()).unwrap_or_default(),
                truncate(&paper.title, TITLE_WIDTH),
                truncate(&paper.authors_display(), TITLE_WIDTH / 2),
                paper.year.map(|y| y.to_string()).unwrap_or_default(),
                paper.doi.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format one paper with all of its fields.
    pub fn format_paper(&self, paper: &Paper) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&paper_json(paper))?),
            OutputFormat::Quiet => Ok(paper.id.map(|id| id.to_string()).unwrap_or_default()),
            OutputFormat::Table => {
                let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record([
                    "ID".to_string(),
                    paper.id.map(|id| id.to_string()).unwrap_or_default(),
                ]);
                builder.push_record(["Title".to_string(), paper.title.clone()]);
                builder.push_record(["Authors".to_string(), paper.authors_display()]);
                builder.push_record([
                    "Year".to_string(),
                    paper.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
                ]);
                builder.push_record(["DOI".to_string(), paper.doi.clone()]);
                builder.push_record(["Venue".to_string(), optional(&paper.venue)]);
                builder.push_record(["Fields".to_string(), paper.fields_of_study.join(", ")]);
                builder.push_record(["Citations".to_string(), paper.citation_count.to_string()]);
                builder.push_record(["URL".to_string(), optional(&paper.url)]);

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let mut output = table.to_string();
                if let Some(text) = paper.abstract_text.as_deref().filter(|t| !t.trim().is_empty()) {
                    output.push_str("\n\n");
                    output.push_str(&self.colorize("Abstract", "cyan"));
                    output.push('\n');
                    output.push_str(text.trim());
                }
                Ok(output)
            }
        }
    }

    /// Format extraction results.
    pub fn format_skills(&self, skills: &[ExtractedSkill]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = skills
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "id": s.id.to_string(),
                            "paper_id": s.paper_id.value(),
                            "skill_name": s.skill_name,
                            "skill_uri": s.skill_uri,
                            "confidence": s.confidence,
                            "author_name": s.author_name,
                            "embedding_model": s.embedding_model,
                            "created_at": s.created_at
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(skills
                .iter()
                .map(|s| s.skill_name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if skills.is_empty() {
                    return Ok(self.colorize("No skills found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Skill", "Confidence", "Author", "Model", "Created"]);
                for skill in skills {
                    builder.push_record([
                        skill.skill_name.clone(),
                        format!("{:.4}", skill.confidence),
                        skill.author_name.clone().unwrap_or_default(),
                        skill.embedding_model.clone(),
                        skill.created_at.to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format the summary of an extraction run.
    pub fn format_report(&self, report: &ExtractionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<serde_json::Value> = report
                    .failures
                    .iter()
                    .map(|f| serde_json::json!({ "paper_id": f.paper_id.value(), "message": f.message }))
                    .collect();
                let value = serde_json::json!({
                    "processed": report.processed,
                    "skipped_existing": report.skipped_existing,
                    "skipped_empty": report.skipped_empty,
                    "results_created": report.results_created,
                    "failures": failures,
                    "model": report.model_id,
                    "processing_time_ms": report.processing_time_ms
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(report.processed.to_string()),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&format!(
                    "Processed {} paper(s) with '{}'",
                    report.processed, report.model_id
                ))];
                lines.push(format!("  Results created:   {}", report.results_created));
                lines.push(format!("  Skipped (existing): {}", report.skipped_existing));
                lines.push(format!("  Skipped (empty):   {}", report.skipped_empty));
                lines.push(format!("  Elapsed:           {} ms", report.processing_time_ms));

                if !report.failures.is_empty() {
                    lines.push(self.warning(&format!("{} paper(s) failed:", report.failures.len())));
                    for failure in &report.failures {
                        lines.push(format!("  - paper {}: {}", failure.paper_id, failure.message));
                    }
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the outcome of an import.
    pub fn format_import(&self, created: usize, existing: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &serde_json::json!({ "created": created, "existing": existing }),
            )?),
            OutputFormat::Quiet => Ok(created.to_string()),
            OutputFormat::Table => {
                let mut message = self.success(&format!("Imported {} paper(s)", created));
                if existing > 0 {
                    message.push('\n');
                    message.push_str(&self.info(&format!("{} already present (matched by DOI)", existing)));
                }
                Ok(message)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn paper_json(paper: &Paper) -> serde_json::Value {
    serde_json::json!({
        "id": paper.id.map(|id| id.value()),
        "title": paper.title,
        "authors": paper.authors,
        "year": paper.year,
        "doi": paper.doi,
        "venue": paper.venue,
        "abstract": paper.abstract_text,
        "fields_of_study": paper.fields_of_study,
        "citation_count": paper.citation_count,
        "url": paper.url
    })
}

/// Shorten `text` to at most `max` characters, marking the cut with "…"
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
