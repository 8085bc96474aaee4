//! Document layout: turns a [`SummaryDocument`] into positioned lines of text
//! on fixed-size pages.
//!
//! Coordinates are millimetres measured from the top-left corner of the page;
//! a block's `y` is the top of its line box. Lines are wrapped greedily at
//! whitespace and placed top to bottom. Before a line is placed the engine
//! checks whether it still fits above the bottom margin and, if not, emits a
//! [`LayoutItem::PageBreak`] first, so a line never straddles two pages.

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::SummaryDocument;
use crate::metrics::TextMeasure;
use crate::style::{FontFamily, FontWeight, StyleSheet, TextRole, TextStyle};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const BULLET_MARKER: &str = "•";
pub const BULLET_HEADING: &str = "Pontos Chave";

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("page size must be positive, got {width} x {height} mm")]
    InvalidPageSize { width: f32, height: f32 },

    #[error("margins leave no printable area on a {width} x {height} mm page")]
    InvalidMargins { width: f32, height: f32 },

    #[error("style for {role:?} needs a positive font size and line height")]
    InvalidStyle { role: TextRole },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 15.0,
            bottom: 20.0,
            left: 15.0,
        }
    }
}

/// Page geometry and typography for a layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    /// Offset of bullet lines from the left margin.
    pub bullet_indent: f32,
    pub styles: StyleSheet,
    pub bullet_heading: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            margins: Margins::default(),
            bullet_indent: 5.0,
            styles: StyleSheet::default(),
            bullet_heading: BULLET_HEADING.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let (width, height) = (self.page_width, self.page_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidPageSize { width, height });
        }

        let m = &self.margins;
        let margins_ok = [m.top, m.right, m.bottom, m.left, self.bullet_indent]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !margins_ok || self.bullet_width() <= 0.0 || self.bottom_limit() <= m.top {
            return Err(LayoutError::InvalidMargins { width, height });
        }

        for (role, style) in self.styles.iter() {
            let positive = |v: f32| v.is_finite() && v > 0.0;
            if !positive(style.font_size)
                || !positive(style.line_height)
                || !(style.space_after.is_finite() && style.space_after >= 0.0)
            {
                return Err(LayoutError::InvalidStyle { role });
            }
        }
        Ok(())
    }

    /// Width available to unindented text.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }

    pub fn bullet_width(&self) -> f32 {
        self.content_width() - self.bullet_indent
    }

    /// Lowest `y` a line box may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margins.bottom
    }
}

/// One positioned, styled line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_family: FontFamily,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub role: TextRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutItem {
    Block(PageBlock),
    PageBreak,
}

/// The ordered output of a layout run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub items: Vec<LayoutItem>,
}

impl DocumentLayout {
    pub fn blocks(&self) -> impl Iterator<Item = &PageBlock> {
        self.items.iter().filter_map(|item| match item {
            LayoutItem::Block(block) => Some(block),
            LayoutItem::PageBreak => None,
        })
    }

    pub fn page_count(&self) -> usize {
        1 + self
            .items
            .iter()
            .filter(|item| matches!(item, LayoutItem::PageBreak))
            .count()
    }

    /// Blocks grouped by page, in page order.
    pub fn pages(&self) -> Vec<Vec<&PageBlock>> {
        let mut pages = vec![Vec::new()];
        for item in &self.items {
            match item {
                LayoutItem::Block(block) => {
                    if let Some(page) = pages.last_mut() {
                        page.push(block);
                    }
                }
                LayoutItem::PageBreak => pages.push(Vec::new()),
            }
        }
        pages
    }

    /// Plain text of every block, one per line, with a form feed between pages.
    pub fn to_plain_text(&self) -> String {
        self.pages()
            .iter()
            .map(|page| page.iter().map(|b| b.text.as_str()).join("\n"))
            .join("\n\x0c\n")
    }
}

/// Splits `text` into the fewest lines whose measured width fits `max_width`.
///
/// Breaks only at whitespace and collapses whitespace runs. A word wider than
/// `max_width` gets a line of its own and is not split.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    max_width: f32,
    style: &TextStyle,
    measure: &M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let fitted_len = current.len();
        current.push(' ');
        current.push_str(word);
        if measure.text_width(&current, style) > max_width {
            current.truncate(fitted_len);
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct LayoutCursor {
    y: f32,
    page: usize,
    page_has_content: bool,
}

/// Lays out summary documents for a fixed page configuration.
pub struct LayoutEngine<M> {
    config: LayoutConfig,
    measure: M,
}

impl<M: TextMeasure> LayoutEngine<M> {
    /// Rejects invalid page geometry up front; a constructed engine cannot fail.
    pub fn new(config: LayoutConfig, measure: M) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config, measure })
    }

    pub fn layout(&self, doc: &SummaryDocument, metadata: &str) -> DocumentLayout {
        let cfg = &self.config;
        let styles = &cfg.styles;
        let left = cfg.margins.left;
        let mut cursor = LayoutCursor {
            y: cfg.margins.top,
            page: 0,
            page_has_content: false,
        };
        let mut items = Vec::new();

        let title = self.wrap(&doc.title, TextRole::Title, cfg.content_width());
        self.place_lines(&mut cursor, &mut items, TextRole::Title, title, left);

        let meta = self.wrap(metadata, TextRole::Metadata, cfg.content_width());
        self.place_lines(&mut cursor, &mut items, TextRole::Metadata, meta, left);

        let mut has_body = false;
        for paragraph in doc.paragraphs() {
            if has_body {
                // blank line between paragraphs
                cursor.y += styles.body.line_height;
            }
            let lines = self.wrap(paragraph, TextRole::Body, cfg.content_width());
            self.place_lines_tight(&mut cursor, &mut items, TextRole::Body, lines, left);
            has_body = true;
        }
        if has_body {
            cursor.y += styles.body.space_after;
        }

        if !doc.bullet_points.is_empty() {
            let heading = self.wrap(
                &cfg.bullet_heading,
                TextRole::BulletHeading,
                cfg.content_width(),
            );
            self.place_lines(&mut cursor, &mut items, TextRole::BulletHeading, heading, left);

            let x = left + cfg.bullet_indent;
            for point in &doc.bullet_points {
                let marked = format!("{BULLET_MARKER} {point}");
                let lines = self.wrap(&marked, TextRole::Bullet, cfg.bullet_width());
                self.place_lines(&mut cursor, &mut items, TextRole::Bullet, lines, x);
            }
        }

        let layout = DocumentLayout { items };
        debug!(
            "Layout complete: {} blocks on {} pages",
            layout.blocks().count(),
            cursor.page + 1
        );
        layout
    }

    fn wrap(&self, text: &str, role: TextRole, max_width: f32) -> Vec<String> {
        wrap_text(
            text,
            max_width,
            self.config.styles.for_role(role),
            &self.measure,
        )
    }

    /// Places a unit of lines and then the role's trailing gap.
    fn place_lines(
        &self,
        cursor: &mut LayoutCursor,
        items: &mut Vec<LayoutItem>,
        role: TextRole,
        lines: Vec<String>,
        x: f32,
    ) {
        if lines.is_empty() {
            return;
        }
        self.place_lines_tight(cursor, items, role, lines, x);
        cursor.y += self.config.styles.for_role(role).space_after;
    }

    fn place_lines_tight(
        &self,
        cursor: &mut LayoutCursor,
        items: &mut Vec<LayoutItem>,
        role: TextRole,
        lines: Vec<String>,
        x: f32,
    ) {
        let style = self.config.styles.for_role(role);
        for text in lines {
            if cursor.page_has_content && cursor.y + style.line_height > self.config.bottom_limit()
            {
                debug!("Adding page break before {:?} line at {}", role, cursor.y);
                items.push(LayoutItem::PageBreak);
                cursor.y = self.config.margins.top;
                cursor.page += 1;
                cursor.page_has_content = false;
            }

            items.push(LayoutItem::Block(PageBlock {
                text,
                x,
                y: cursor.y,
                font_family: style.font_family,
                font_size: style.font_size,
                font_weight: style.font_weight,
                role,
            }));
            cursor.y += style.line_height;
            cursor.page_has_content = true;
        }
    }
}

/// One-shot layout with an explicit configuration and measurer.
pub fn layout_document<M: TextMeasure>(
    doc: &SummaryDocument,
    metadata: &str,
    config: &LayoutConfig,
    measure: M,
) -> Result<DocumentLayout, LayoutError> {
    let engine = LayoutEngine::new(config.clone(), measure)?;
    Ok(engine.layout(doc, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AverageCharWidth, Monospace};

    /// Page whose printable width is `width` characters at one unit per char.
    fn mono_config(width: f32, height: f32) -> LayoutConfig {
        let mut styles = StyleSheet::default();
        styles.title.line_height = 1.0;
        styles.title.space_after = 0.0;
        styles.metadata.line_height = 1.0;
        styles.metadata.space_after = 0.0;
        styles.body.line_height = 1.0;
        styles.body.space_after = 0.0;
        styles.bullet_heading.line_height = 1.0;
        styles.bullet.line_height = 1.0;
        styles.bullet.space_after = 0.0;
        LayoutConfig {
            page_width: width,
            page_height: height,
            margins: Margins::uniform(0.0),
            bullet_indent: 0.0,
            styles,
            bullet_heading: BULLET_HEADING.to_string(),
        }
    }

    fn texts(layout: &DocumentLayout, role: TextRole) -> Vec<String> {
        layout
            .blocks()
            .filter(|b| b.role == role)
            .map(|b| b.text.clone())
            .collect()
    }

    fn sample_document() -> SummaryDocument {
        SummaryDocument::new(
            "Governo anuncia novo pacote de medidas econômicas para o setor agrícola",
            "O governo federal anunciou nesta terça-feira um pacote de medidas voltadas ao setor agrícola, \
             com linhas de crédito subsidiado e renegociação de dívidas.\n\
             Segundo o ministério, os recursos devem chegar aos produtores ainda neste semestre.\n\n\
             Entidades do setor receberam o anúncio com cautela.",
            vec![
                "Crédito subsidiado para pequenos produtores".to_string(),
                "Renegociação de dívidas em até dez anos".to_string(),
                "Recursos liberados ainda neste semestre".to_string(),
            ],
        )
    }

    // ── wrap_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_two_words_per_line() {
        let style = StyleSheet::default().body;
        let lines = wrap_text("Alpha beta gamma.", 10.0, &style, &Monospace::new(1.0));
        assert_eq!(lines, vec!["Alpha beta", "gamma."]);
    }

    #[test]
    fn test_wrap_oversized_word_alone() {
        let style = StyleSheet::default().body;
        let lines = wrap_text(
            "a supercalifragilistic b",
            5.0,
            &style,
            &Monospace::new(1.0),
        );
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        let style = StyleSheet::default().body;
        let lines = wrap_text("  one\t two \n three  ", 100.0, &style, &Monospace::new(1.0));
        assert_eq!(lines, vec!["one two three"]);
    }

    #[test]
    fn test_wrap_blank_text_yields_nothing() {
        let style = StyleSheet::default().body;
        assert!(wrap_text("   ", 10.0, &style, &Monospace::new(1.0)).is_empty());
    }

    #[test]
    fn test_wrap_lines_respect_width() {
        let style = StyleSheet::default().body;
        let measure = AverageCharWidth::default();
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(20);
        for width in [40.0, 55.5, 120.0, 180.0] {
            let lines = wrap_text(&text, width, &style, &measure);
            assert!(!lines.is_empty());
            for line in &lines {
                assert!(measure.text_width(line, &style) <= width, "{line:?} > {width}");
            }
            assert_eq!(lines.join(" "), text.split_whitespace().join(" "));
        }
    }

    // ── validation ──────────────────────────────────────────────────────────

    #[test]
    fn test_rejects_non_positive_page_size() {
        for (w, h) in [(0.0, 297.0), (210.0, 0.0), (-1.0, 10.0), (f32::NAN, 10.0)] {
            let config = LayoutConfig {
                page_width: w,
                page_height: h,
                ..LayoutConfig::default()
            };
            let result = LayoutEngine::new(config, Monospace::new(1.0));
            assert!(
                matches!(result, Err(LayoutError::InvalidPageSize { .. })),
                "{w} x {h} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_margins_wider_than_page() {
        let config = LayoutConfig {
            page_width: 20.0,
            margins: Margins::uniform(10.0),
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidMargins { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_line_height() {
        let mut config = LayoutConfig::default();
        config.styles.bullet.line_height = 0.0;
        assert_eq!(
            config.validate(),
            Err(LayoutError::InvalidStyle {
                role: TextRole::Bullet
            })
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    // ── layout ──────────────────────────────────────────────────────────────

    #[test]
    fn test_body_wraps_at_two_words() {
        let doc = SummaryDocument::new("", "Alpha beta gamma.", vec![]);
        let layout =
            layout_document(&doc, "", &mono_config(10.0, 100.0), Monospace::new(1.0)).unwrap();
        assert_eq!(texts(&layout, TextRole::Body), vec!["Alpha beta", "gamma."]);
    }

    #[test]
    fn test_section_order() {
        let doc = sample_document();
        let layout =
            layout_document(&doc, "meta", &LayoutConfig::default(), AverageCharWidth::default())
                .unwrap();
        let roles: Vec<TextRole> = layout.blocks().map(|b| b.role).dedup().collect();
        assert_eq!(
            roles,
            vec![
                TextRole::Title,
                TextRole::Metadata,
                TextRole::Body,
                TextRole::BulletHeading,
                TextRole::Bullet,
            ]
        );
    }

    #[test]
    fn test_empty_body_still_has_title_and_metadata() {
        let doc = SummaryDocument::new("Title here", "", vec![]);
        let layout =
            layout_document(&doc, "News • 2024", &mono_config(40.0, 100.0), Monospace::new(1.0))
                .unwrap();
        assert_eq!(texts(&layout, TextRole::Title), vec!["Title here"]);
        assert_eq!(texts(&layout, TextRole::Metadata), vec!["News • 2024"]);
        assert!(texts(&layout, TextRole::Body).is_empty());
    }

    #[test]
    fn test_no_bullets_no_heading() {
        let doc = SummaryDocument::new("T", "Body.", vec![]);
        let layout =
            layout_document(&doc, "m", &mono_config(40.0, 100.0), Monospace::new(1.0)).unwrap();
        assert!(layout.blocks().all(|b| b.text != BULLET_HEADING));
        assert!(texts(&layout, TextRole::BulletHeading).is_empty());
    }

    #[test]
    fn test_bullets_are_marked_and_indented() {
        let mut config = LayoutConfig::default();
        config.bullet_indent = 7.0;
        let doc = SummaryDocument::new("T", "", vec!["first".into(), "second".into()]);
        let layout = layout_document(&doc, "", &config, AverageCharWidth::default()).unwrap();
        let bullets: Vec<&PageBlock> = layout
            .blocks()
            .filter(|b| b.role == TextRole::Bullet)
            .collect();
        assert_eq!(bullets.len(), 2);
        assert_eq!(bullets[0].text, "• first");
        assert_eq!(bullets[1].text, "• second");
        assert!(bullets.iter().all(|b| b.x == config.margins.left + 7.0));
        assert_eq!(texts(&layout, TextRole::BulletHeading), vec![BULLET_HEADING]);
    }

    #[test]
    fn test_oversized_word_placed_without_error() {
        let doc = SummaryDocument::new("", "tiny Pneumoultramicroscopicossilicovulcanoconiótico end", vec![]);
        let layout =
            layout_document(&doc, "", &mono_config(8.0, 100.0), Monospace::new(1.0)).unwrap();
        assert_eq!(
            texts(&layout, TextRole::Body),
            vec!["tiny", "Pneumoultramicroscopicossilicovulcanoconiótico", "end"]
        );
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let doc = SummaryDocument::new("", "one\ntwo", vec![]);
        let layout =
            layout_document(&doc, "", &mono_config(20.0, 100.0), Monospace::new(1.0)).unwrap();
        let ys: Vec<f32> = layout.blocks().map(|b| b.y).collect();
        assert_eq!(ys, vec![0.0, 2.0]);
    }

    #[test]
    fn test_page_break_before_overflowing_block() {
        // five lines fit per page
        let doc = SummaryDocument::new(
            "Headline",
            "alpha beta gamma delta",
            vec!["one".into(), "two".into(), "three".into()],
        );
        let config = mono_config(10.0, 5.0);
        let layout = layout_document(&doc, "meta", &config, Monospace::new(1.0)).unwrap();

        let break_at = layout
            .items
            .iter()
            .position(|i| matches!(i, LayoutItem::PageBreak))
            .expect("expected a page break");
        assert!(break_at > 0);
        assert!(layout.page_count() >= 2);

        // the block right after the break starts at the top margin
        match &layout.items[break_at + 1] {
            LayoutItem::Block(b) => assert_eq!(b.y, config.margins.top),
            other => panic!("expected block after break, got {other:?}"),
        }
    }

    #[test]
    fn test_blocks_never_cross_bottom_margin() {
        let doc = sample_document();
        let mut config = LayoutConfig::default();
        config.page_height = 90.0;
        let layout = layout_document(&doc, "DRM News Summary • 01/01/2025", &config, AverageCharWidth::default())
            .unwrap();
        assert!(layout.page_count() > 1);
        for block in layout.blocks() {
            let lh = config.styles.for_role(block.role).line_height;
            assert!(
                block.y + lh <= config.bottom_limit() + 1e-4,
                "{block:?} crosses the bottom margin"
            );
        }
    }

    #[test]
    fn test_lines_fit_available_width() {
        let doc = sample_document();
        let config = LayoutConfig::default();
        let measure = AverageCharWidth::default();
        let layout = layout_document(&doc, "meta", &config, measure).unwrap();
        for block in layout.blocks() {
            let style = config.styles.for_role(block.role);
            let available = config.page_width - config.margins.right - block.x;
            assert!(measure.text_width(&block.text, style) <= available + 1e-4);
        }
    }

    #[test]
    fn test_block_count_matches_wrapped_lines() {
        let doc = sample_document();
        let config = LayoutConfig::default();
        let measure = AverageCharWidth::default();
        let layout = layout_document(&doc, "meta", &config, measure).unwrap();

        let s = &config.styles;
        let w = config.content_width();
        let mut expected = wrap_text(&doc.title, w, &s.title, &measure).len()
            + wrap_text("meta", w, &s.metadata, &measure).len()
            + wrap_text(&config.bullet_heading, w, &s.bullet_heading, &measure).len();
        for p in doc.paragraphs() {
            expected += wrap_text(p, w, &s.body, &measure).len();
        }
        for b in &doc.bullet_points {
            expected += wrap_text(&format!("• {b}"), config.bullet_width(), &s.bullet, &measure).len();
        }
        assert_eq!(layout.blocks().count(), expected);
    }

    #[test]
    fn test_no_text_lost() {
        let doc = sample_document();
        let layout =
            layout_document(&doc, "", &mono_config(25.0, 12.0), Monospace::new(1.0)).unwrap();
        let body: String = texts(&layout, TextRole::Body).join(" ");
        let expected = doc.paragraphs().join(" ");
        assert_eq!(body, expected.split_whitespace().join(" "));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let doc = sample_document();
        let engine = LayoutEngine::new(LayoutConfig::default(), AverageCharWidth::default()).unwrap();
        assert_eq!(engine.layout(&doc, "m"), engine.layout(&doc, "m"));
    }

    #[test]
    fn test_line_taller_than_page_does_not_loop() {
        let mut config = mono_config(5.0, 3.0);
        config.styles.title.line_height = 10.0;
        let doc = SummaryDocument::new("big title", "", vec![]);
        let layout = layout_document(&doc, "", &config, Monospace::new(1.0)).unwrap();
        assert_eq!(layout.blocks().count(), 2);
        assert_eq!(layout.page_count(), 2);
        assert!(!matches!(layout.items[0], LayoutItem::PageBreak));
    }

    #[test]
    fn test_pages_and_plain_text() {
        let doc = SummaryDocument::new("", "a b c d", vec![]);
        let layout =
            layout_document(&doc, "", &mono_config(1.0, 2.0), Monospace::new(1.0)).unwrap();
        let pages = layout.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(layout.to_plain_text(), "a\nb\n\x0c\nc\nd");
    }
}
