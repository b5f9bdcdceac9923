//! PDF rendering pipeline.
//!
//! `composer` owns the low-level page assembly (fonts, content streams,
//! pagination), `images` turns raster bytes into embeddable XObjects, and
//! `report_pdf` walks a report record through the fixed document layout.

pub mod composer;
pub mod images;
pub mod report_pdf;

pub use report_pdf::{render_report_pdf, RenderOptions, ReportAssets};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF object error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("stream compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

/// Per-asset outcome of the best-effort image pipeline. A skipped asset is
/// omitted from the document; it never aborts rendering.
#[derive(Debug, Clone)]
pub enum AssetImage {
    Loaded { name: String, bytes: Vec<u8> },
    Skipped { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub name: String,
    pub reason: String,
}

/// A finished document buffer plus everything that was left out of it.
#[derive(Debug)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub skipped: Vec<SkippedAsset>,
}
