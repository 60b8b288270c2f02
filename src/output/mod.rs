//! Output module for rendering collected pages into artifacts
//!
//! This module handles:
//! - The plain-text artifact (single canonical format)
//! - The shared paginated layout
//! - The paginated document artifact, rendered by a chain of PDF backends

pub mod document;
pub mod layout;
mod text;

#[cfg(feature = "pdf-writer")]
mod pdf_writer_backend;
#[cfg(feature = "printpdf")]
mod printpdf_backend;

pub use document::{DocumentBackend, DocumentExporter, RenderedDocument};
#[cfg(feature = "pdf-writer")]
pub use pdf_writer_backend::PdfWriterBackend;
#[cfg(feature = "printpdf")]
pub use printpdf_backend::PrintPdfBackend;
pub use text::{export_text, render_text, SEPARATOR_WIDTH};
