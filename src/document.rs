use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
};

/// Summarization depth requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Short,
    Medium,
    Analytical,
}

impl Verbosity {
    pub fn label(&self) -> &'static str {
        match self {
            Verbosity::Short => "Curto",
            Verbosity::Medium => "Médio",
            Verbosity::Analytical => "Analítico",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Short => "short",
            Verbosity::Medium => "medium",
            Verbosity::Analytical => "analytical",
        };
        f.write_str(s)
    }
}

/// A structured summary as returned by the summarization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub title: String,
    #[serde(rename = "summary")]
    pub body_text: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

impl SummaryDocument {
    pub fn new(
        title: impl Into<String>,
        body_text: impl Into<String>,
        bullet_points: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body_text: body_text.into(),
            bullet_points,
        }
    }

    /// Non-blank lines of the body, trimmed.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.body_text
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A summary together with how and when it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[serde(flatten)]
    pub document: SummaryDocument,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub verbosity: Verbosity,
    pub original_text_length: usize,
}

impl SummaryResult {
    pub fn new(document: SummaryDocument, verbosity: Verbosity, source_text: &str) -> Self {
        Self {
            document,
            timestamp: Utc::now(),
            verbosity,
            original_text_length: source_text.chars().count(),
        }
    }
}

/// Reads a summary from a JSON file.
///
/// Accepts both a bare summary (`title`, `summary`, `bulletPoints`) and a
/// saved [`SummaryResult`]; the extra fields of the latter are ignored.
pub fn read_summary(path: &Path) -> Result<SummaryDocument> {
    debug!("Opening summary file: {}", path.display());
    let file = File::open(path)
        .with_context(|| format!("Failed to open summary file: {}", path.display()))?;
    let document: SummaryDocument = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse summary file: {}", path.display()))?;
    debug!(
        "Summary loaded: {} paragraphs, {} bullet points",
        document.paragraphs().count(),
        document.bullet_points.len()
    );
    Ok(document)
}
