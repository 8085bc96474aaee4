//! Summaries of news text at three verbosity tiers, exported as markdown or
//! as a paginated PDF laid out by [`layout::LayoutEngine`].

pub mod config;
pub mod document;
pub mod export;
pub mod history;
pub mod layout;
pub mod markdown;
pub mod metrics;
pub mod pdf_writer;
pub mod plan;
pub mod style;
pub mod summarizer;
pub mod utils;

pub use document::{SummaryDocument, SummaryResult, Verbosity};
pub use layout::{
    layout_document, DocumentLayout, LayoutConfig, LayoutEngine, LayoutError, LayoutItem,
    PageBlock,
};
pub use metrics::{AverageCharWidth, Monospace, TextMeasure};
