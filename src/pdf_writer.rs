use anyhow::{Context, Result};
use log::{debug, info};
use printpdf::*;
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;

use crate::layout::{DocumentLayout, LayoutConfig, LayoutItem, PageBlock};
use crate::style::{FontFamily, FontWeight, TextRole, PT_TO_MM};

/// Fraction of the font size between the top of the line box and the baseline.
const BASELINE_RATIO: f32 = 0.8;
const METADATA_GREY: f32 = 0.4;

struct FontSet {
    helvetica: IndirectFontRef,
    helvetica_bold: IndirectFontRef,
    times: IndirectFontRef,
    times_bold: IndirectFontRef,
    courier: IndirectFontRef,
    courier_bold: IndirectFontRef,
}

impl FontSet {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        debug!("Adding built-in fonts");
        Ok(Self {
            helvetica: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            helvetica_bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            times: doc.add_builtin_font(BuiltinFont::TimesRoman)?,
            times_bold: doc.add_builtin_font(BuiltinFont::TimesBold)?,
            courier: doc.add_builtin_font(BuiltinFont::Courier)?,
            courier_bold: doc.add_builtin_font(BuiltinFont::CourierBold)?,
        })
    }

    fn get(&self, family: FontFamily, weight: FontWeight) -> &IndirectFontRef {
        match (family, weight) {
            (FontFamily::Helvetica, FontWeight::Normal) => &self.helvetica,
            (FontFamily::Helvetica, FontWeight::Bold) => &self.helvetica_bold,
            (FontFamily::Times, FontWeight::Normal) => &self.times,
            (FontFamily::Times, FontWeight::Bold) => &self.times_bold,
            (FontFamily::Courier, FontWeight::Normal) => &self.courier,
            (FontFamily::Courier, FontWeight::Bold) => &self.courier_bold,
        }
    }
}

/// Renders a finished layout into PDF bytes, one PDF page per layout page.
pub fn render_pdf(layout: &DocumentLayout, config: &LayoutConfig, title: &str) -> Result<Vec<u8>> {
    debug!("Starting PDF rendering");
    let page_width = Mm(config.page_width);
    let page_height = Mm(config.page_height);
    let (doc, page1, layer1) = PdfDocument::new(title, page_width, page_height, "Layer 1");
    let mut current_layer = doc.get_page(page1).get_layer(layer1);
    let fonts = FontSet::load(&doc)?;

    let mut page_count = 1;
    for item in &layout.items {
        match item {
            LayoutItem::PageBreak => {
                debug!("Adding new page");
                let (page, layer) = doc.add_page(page_width, page_height, "New Page");
                current_layer = doc.get_page(page).get_layer(layer);
                page_count += 1;
            }
            LayoutItem::Block(block) => {
                draw_block(&current_layer, block, config, &fonts);
            }
        }
    }

    let bytes = doc
        .save_to_bytes()
        .context("Failed to serialize PDF document")?;
    info!(
        "PDF rendered: {} pages, {} bytes",
        page_count,
        bytes.len()
    );
    Ok(bytes)
}

fn draw_block(layer: &PdfLayerReference, block: &PageBlock, config: &LayoutConfig, fonts: &FontSet) {
    let font = fonts.get(block.font_family, block.font_weight);
    let baseline = block.y + block.font_size * PT_TO_MM * BASELINE_RATIO;
    let y_position = config.page_height - baseline;

    let grey = block.role == TextRole::Metadata;
    if grey {
        layer.set_fill_color(Color::Greyscale(Greyscale::new(METADATA_GREY, None)));
    }
    layer.use_text(
        block.text.clone(),
        block.font_size,
        Mm(block.x),
        Mm(y_position),
        font,
    );
    if grey {
        layer.set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));
    }
}

/// Renders and writes a PDF. The bytes go to a temporary file next to
/// `pdf_path` that is renamed into place, so a failed write leaves no file.
pub fn write_pdf(
    layout: &DocumentLayout,
    config: &LayoutConfig,
    title: &str,
    pdf_path: &Path,
) -> Result<()> {
    let bytes = render_pdf(layout, config, title)?;

    debug!("Saving PDF to {}", pdf_path.display());
    let dir = match pdf_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create PDF file: {}", pdf_path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("Failed to save PDF file: {}", pdf_path.display()))?;
    file.persist(pdf_path)
        .with_context(|| format!("Failed to save PDF file: {}", pdf_path.display()))?;

    info!("PDF saved successfully: {}", pdf_path.display());
    Ok(())
}
