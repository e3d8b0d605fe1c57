//! Rendering collaborator: document + page range → ordered page image files.
//!
//! The rest of the pipeline treats rendering as an opaque service behind
//! [`RenderWorker`]: hand it a materialised document, get back per-page image
//! files in the work area. Two workers exist — pdfium for PDFs, and a
//! trivial one for single-image documents, which are their own one-page
//! rendering.
//!
//! ## Why spawn_blocking?
//!
//! pdfium wraps a C++ library with thread-local state; it is not safe to
//! call from async contexts. `tokio::task::spawn_blocking` moves the
//! CPU-heavy rasterisation onto the blocking pool so the runtime's worker
//! threads never stall.
//!
//! ## Ordering
//!
//! Callers must not trust the order of the returned paths; the pipeline
//! sorts them lexicographically before transcription (see
//! [`crate::convert`]).

use crate::error::ConvertError;
use crate::pipeline::input::DocumentKind;
use crate::pipeline::pages::PageRange;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Longest edge of a rendered page in pixels.
///
/// Caps memory per page regardless of physical page size and lands in the
/// resolution sweet spot for vision models (1,024–2,048 px).
const MAX_RENDER_DIMENSION: i32 = 2000;

/// An opaque per-run rendering job.
#[async_trait]
pub trait RenderWorker: Send + Sync {
    /// Produce the page image files for this document and range.
    async fn render(&self) -> Result<Vec<PathBuf>, ConvertError>;
}

/// Create the worker matching the document type.
///
/// # Errors
/// [`ConvertError::InvalidDocument`] when the renderer cannot handle the
/// document. Range errors surface later, from [`RenderWorker::render`],
/// once the page count is known.
pub fn create_worker(
    doc_path: &Path,
    kind: DocumentKind,
    range: PageRange,
    workdir: &Path,
) -> Result<Box<dyn RenderWorker>, ConvertError> {
    match kind {
        DocumentKind::Pdf => Ok(Box::new(PdfWorker {
            doc_path: doc_path.to_path_buf(),
            range,
            workdir: workdir.to_path_buf(),
        })),
        DocumentKind::Jpeg | DocumentKind::Png | DocumentKind::Bmp => Ok(Box::new(ImageWorker {
            doc_path: doc_path.to_path_buf(),
        })),
    }
}

/// pdfium-backed PDF rasterisation.
struct PdfWorker {
    doc_path: PathBuf,
    range: PageRange,
    workdir: PathBuf,
}

#[async_trait]
impl RenderWorker for PdfWorker {
    async fn render(&self) -> Result<Vec<PathBuf>, ConvertError> {
        let path = self.doc_path.clone();
        let range = self.range;
        let workdir = self.workdir.clone();

        tokio::task::spawn_blocking(move || render_pdf_blocking(&path, range, &workdir))
            .await
            .map_err(|e| ConvertError::Internal(format!("render task panicked: {e}")))?
    }
}

fn render_pdf_blocking(
    pdf_path: &Path,
    range: PageRange,
    workdir: &Path,
) -> Result<Vec<PathBuf>, ConvertError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ConvertError::InvalidDocument {
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total = u32::from(pages.len());
    info!("PDF loaded: {} pages", total);

    let end = range.effective_end(total);
    if range.start > total {
        return Err(ConvertError::PageOutOfRange {
            page: range.start,
            total,
        });
    }
    if end > total {
        return Err(ConvertError::PageOutOfRange { page: end, total });
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(MAX_RENDER_DIMENSION)
        .set_maximum_height(MAX_RENDER_DIMENSION);

    let mut paths = Vec::with_capacity((end - range.start + 1) as usize);

    for page_num in range.start..=end {
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| ConvertError::RenderFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ConvertError::RenderFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        let out = workdir.join(format!("page_{page_num}.png"));
        image
            .save_with_format(&out, image::ImageFormat::Png)
            .map_err(|e| ConvertError::RenderFailed {
                page: page_num,
                detail: e.to_string(),
            })?;

        debug!(
            "Rendered page {} → {} ({}x{} px)",
            page_num,
            out.display(),
            image.width(),
            image.height()
        );
        paths.push(out);
    }

    Ok(paths)
}

/// A single image document is its own one-page rendering.
struct ImageWorker {
    doc_path: PathBuf,
}

#[async_trait]
impl RenderWorker for ImageWorker {
    async fn render(&self) -> Result<Vec<PathBuf>, ConvertError> {
        Ok(vec![self.doc_path.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn image_worker_returns_the_document_itself() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("input.png");
        std::fs::write(&doc, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let worker = create_worker(&doc, DocumentKind::Png, PageRange::default(), dir.path())
            .expect("image worker");
        let paths = worker.render().await.unwrap();
        assert_eq!(paths, vec![doc]);
    }

    #[tokio::test]
    async fn pdf_worker_rejects_garbage_documents() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("input.pdf");
        std::fs::write(&doc, b"%PDF-not really").unwrap();

        let worker = create_worker(&doc, DocumentKind::Pdf, PageRange::default(), dir.path())
            .expect("pdf worker");
        // Either the pdfium library is unavailable (Internal) or the
        // document fails to parse (InvalidDocument); both are fatal.
        assert!(worker.render().await.is_err());
    }
}
