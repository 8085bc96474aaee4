use itertools::Itertools;

use crate::document::SummaryDocument;
use crate::layout::BULLET_HEADING;

pub const SUMMARY_HEADING: &str = "Resumo";

/// Renders a summary as markdown: title, summary section, key points.
pub fn to_markdown(doc: &SummaryDocument) -> String {
    let mut out = format!("# {}\n\n## {}\n{}", doc.title, SUMMARY_HEADING, doc.body_text);
    out.push_str(&format!("\n\n## {BULLET_HEADING}\n"));
    out.push_str(&doc.bullet_points.iter().map(|p| format!("- {p}")).join("\n"));
    out
}
