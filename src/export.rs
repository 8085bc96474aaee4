use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::document::SummaryDocument;
use crate::layout::{layout_document, LayoutConfig};
use crate::markdown::to_markdown;
use crate::metrics::TextMeasure;
use crate::pdf_writer::write_pdf;
use crate::plan::Plan;
use crate::utils::export_file_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Markdown => f.write_str("markdown"),
            ExportFormat::Pdf => f.write_str("pdf"),
        }
    }
}

/// The grey line printed under the title of a PDF export.
pub fn metadata_line(brand: &str, date: NaiveDate) -> String {
    format!("{} • {}", brand, date.format("%d/%m/%Y"))
}

/// Everything an export needs besides the document itself.
pub struct ExportOptions<M> {
    pub plan: Plan,
    pub layout: LayoutConfig,
    pub measure: M,
    pub metadata: String,
}

/// Writes `doc` into `out_dir` in the requested format and returns the path.
///
/// The plan is checked before anything is rendered, and the file is only
/// created once the full output exists in memory.
pub fn export_summary<M: TextMeasure>(
    doc: &SummaryDocument,
    format: ExportFormat,
    out_dir: &Path,
    options: &ExportOptions<M>,
) -> Result<PathBuf> {
    options.plan.check_export(format)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let path = out_dir.join(export_file_name(&doc.title, format.extension()));
    debug!("Exporting '{}' as {} to {}", doc.title, format, path.display());

    match format {
        ExportFormat::Markdown => {
            fs::write(&path, to_markdown(doc))
                .with_context(|| format!("Failed to write markdown file: {}", path.display()))?;
        }
        ExportFormat::Pdf => {
            let layout =
                layout_document(doc, &options.metadata, &options.layout, &options.measure)?;
            write_pdf(&layout, &options.layout, &doc.title, &path)?;
        }
    }

    info!("Exported {} to {}", format, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::AverageCharWidth;
    use crate::plan::PlanError;

    fn options(plan: Plan) -> ExportOptions<AverageCharWidth> {
        ExportOptions {
            plan,
            layout: LayoutConfig::default(),
            measure: AverageCharWidth::default(),
            metadata: "DRM News Summary • 01/02/2026".to_string(),
        }
    }

    fn doc() -> SummaryDocument {
        SummaryDocument::new(
            "Inflação desacelera em setembro",
            "O índice ficou abaixo do esperado.",
            vec!["Queda nos alimentos".to_string()],
        )
    }

    #[test]
    fn test_metadata_line_format() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(metadata_line("DRM News Summary", date), "DRM News Summary • 01/02/2026");
    }

    #[test]
    fn test_markdown_export_on_free_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_summary(&doc(), ExportFormat::Markdown, dir.path(), &options(Plan::Free))
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "Inflação_desacelera_.md");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Inflação desacelera em setembro"));
        assert!(content.ends_with("- Queda nos alimentos"));
    }

    #[test]
    fn test_pdf_export_requires_pro() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_summary(&doc(), ExportFormat::Pdf, dir.path(), &options(Plan::Free))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::RequiresPro { .. })
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_pdf_export_on_pro_plan() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let path = export_summary(&doc(), ExportFormat::Pdf, &out, &options(Plan::Pro)).unwrap();
        assert_eq!(path.extension().unwrap(), "pdf");
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_invalid_layout_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(Plan::Pro);
        opts.layout.page_height = 0.0;
        let result = export_summary(&doc(), ExportFormat::Pdf, dir.path(), &opts);
        assert!(result.is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
