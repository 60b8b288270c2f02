//! Paginated document export
//!
//! This module handles:
//! - The document backend trait implemented by every PDF library adapter
//! - The exporter chain trying backends in order until one renders
//! - Writing the rendered document to disk

use crate::chain::Registry;
use crate::crawler::PageContent;
use crate::output::layout::{layout, Sheet};
use crate::{BackendError, ExportError};
use std::fs;
use std::path::Path;

/// One document-rendering strategy
pub trait DocumentBackend: Send + Sync {
    /// Draws the laid-out sheets, returning the encoded document
    fn render(&self, sheets: &[Sheet], title: &str) -> Result<Vec<u8>, BackendError>;
}

/// A document produced by one backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Name of the backend that produced `bytes`
    pub strategy: String,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ordered list of document backends, first success wins
pub struct DocumentExporter {
    backends: Registry<dyn DocumentBackend>,
    title: String,
}

impl DocumentExporter {
    pub fn new(backends: Registry<dyn DocumentBackend>) -> Self {
        Self {
            backends,
            title: "Scraped content".to_string(),
        }
    }

    /// Sets the document title stored in the metadata
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Default registry: `pdf-writer`, then `printpdf`
    ///
    /// A backend whose cargo feature is disabled is registered as unavailable.
    pub fn default_backends() -> Registry<dyn DocumentBackend> {
        let registry: Registry<dyn DocumentBackend> = Registry::new();

        #[cfg(feature = "pdf-writer")]
        let registry = registry.register(
            super::PdfWriterBackend::NAME,
            Box::new(super::PdfWriterBackend) as Box<dyn DocumentBackend>,
        );
        #[cfg(not(feature = "pdf-writer"))]
        let registry = registry.register_unavailable("pdf-writer", "built without the `pdf-writer` feature");

        #[cfg(feature = "printpdf")]
        let registry = registry.register(
            super::PrintPdfBackend::NAME,
            Box::new(super::PrintPdfBackend) as Box<dyn DocumentBackend>,
        );
        #[cfg(not(feature = "printpdf"))]
        let registry = registry.register_unavailable("printpdf", "built without the `printpdf` feature");

        registry
    }

    pub fn backends(&self) -> &Registry<dyn DocumentBackend> {
        &self.backends
    }

    /// Renders the pages with the first backend that succeeds
    ///
    /// # Returns
    ///
    /// * `Ok(RenderedDocument)` - The bytes and the name of the backend
    /// * `Err(ExportError::NoBackends)` - No backend is available
    /// * `Err(ExportError::Exhausted)` - Every available backend failed
    pub fn export(&self, pages: &[PageContent]) -> Result<RenderedDocument, ExportError> {
        let sheets = layout(pages);
        let mut attempted = false;
        let mut last_error = None;

        for (name, backend) in self.backends.available() {
            attempted = true;
            match backend.render(&sheets, &self.title) {
                Ok(bytes) => {
                    tracing::debug!(
                        "Rendered {} sheets for {} pages via {}",
                        sheets.len(),
                        pages.len(),
                        name
                    );
                    return Ok(RenderedDocument {
                        strategy: name.to_string(),
                        bytes,
                    });
                }
                Err(e) => {
                    tracing::debug!("Document backend {} failed: {}", name, e);
                    last_error = Some(e);
                }
            }
        }

        if !attempted {
            return Err(ExportError::NoBackends);
        }
        Err(ExportError::Exhausted { last: last_error })
    }

    /// Renders the pages and writes the document to `destination`
    ///
    /// Parent directories are created. Returns the name of the backend used.
    pub fn export_to_path(
        &self,
        pages: &[PageContent],
        destination: &Path,
    ) -> Result<String, ExportError> {
        let document = self.export(pages)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, &document.bytes)?;
        Ok(document.strategy)
    }
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::new(Self::default_backends())
    }
}

impl std::fmt::Debug for DocumentExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentExporter")
            .field("backends", &self.backends)
            .field("title", &self.title)
            .finish()
    }
}
