//! Input classification and materialisation to the per-run work area.
//!
//! ## Why classify by bytes at all?
//!
//! Input can arrive on stdin, where there is no filename to inspect. The
//! magic-number table below covers every type the renderer understands, so a
//! bare `markpdfdown < scan.bmp` works exactly like the path form. A
//! recognised extension wins when present; sniffing is the fallback, and
//! when both fail the run stops before any rendering work.
//!
//! ## Why a real directory instead of `tempfile`?
//!
//! The work area is part of the CLI contract: `output/<timestamp>/input.<ext>`
//! holds the materialised document for the duration of the run and is removed
//! recursively at the end. pdfium needs a file-system path anyway — it cannot
//! stream from a byte buffer.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// The fixed enumeration of supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Jpeg,
    Png,
    Bmp,
}

impl DocumentKind {
    /// Map a filename extension (without the dot) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "jpg" | "jpeg" => Some(DocumentKind::Jpeg),
            "png" => Some(DocumentKind::Png),
            "bmp" => Some(DocumentKind::Bmp),
            _ => None,
        }
    }

    /// Sniff the kind from the document's leading bytes.
    ///
    /// Signature table: `%PDF-` → PDF, `FF D8 FF DB` → JPEG,
    /// `89 50 4E 47` → PNG, `42 4D` → BMP.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(DocumentKind::Pdf)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF, 0xDB]) {
            Some(DocumentKind::Jpeg)
        } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(DocumentKind::Png)
        } else if bytes.starts_with(&[0x42, 0x4D]) {
            Some(DocumentKind::Bmp)
        } else {
            None
        }
    }

    /// Canonical extension used when materialising the document.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Jpeg => "jpg",
            DocumentKind::Png => "png",
            DocumentKind::Bmp => "bmp",
        }
    }
}

/// Determine the document type from the filename or the raw bytes.
///
/// A recognised extension takes precedence; otherwise the leading bytes are
/// checked against the signature table.
///
/// # Errors
/// [`ConvertError::UnsupportedFormat`] when neither matches. Fatal: the
/// process stops with no partial output.
pub fn classify(filename: Option<&str>, bytes: &[u8]) -> Result<DocumentKind, ConvertError> {
    if let Some(name) = filename {
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            if let Some(kind) = DocumentKind::from_extension(ext) {
                debug!("Classified '{name}' by extension: {kind:?}");
                return Ok(kind);
            }
        }
    }

    match DocumentKind::sniff(bytes) {
        Some(kind) => {
            info!("Recognized {kind:?} file by content signature");
            Ok(kind)
        }
        None => Err(ConvertError::UnsupportedFormat),
    }
}

/// Create the per-run work area: `output/<timestamp>/`.
///
/// Rendered page images and the materialised input live here; the whole
/// directory is removed recursively at the end of the run.
pub fn create_workdir() -> Result<PathBuf, ConvertError> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ConvertError::Internal(format!("system clock before epoch: {e}")))?
        .as_secs();

    let dir = PathBuf::from("output").join(timestamp.to_string());
    std::fs::create_dir_all(&dir).map_err(|e| ConvertError::WorkDirFailed {
        path: dir.clone(),
        source: e,
    })?;
    debug!("Created work directory: {}", dir.display());
    Ok(dir)
}

/// Write the raw document bytes into the work area as `input.<ext>`.
pub fn materialize(
    bytes: &[u8],
    kind: DocumentKind,
    workdir: &Path,
) -> Result<PathBuf, ConvertError> {
    let path = workdir.join(format!("input.{}", kind.extension()));
    std::fs::write(&path, bytes).map_err(|e| ConvertError::WorkDirFailed {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_recognises_all_signatures() {
        assert_eq!(DocumentKind::sniff(b"%PDF-1.7 ..."), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::sniff(&[0xFF, 0xD8, 0xFF, 0xDB, 0x00]),
            Some(DocumentKind::Jpeg)
        );
        assert_eq!(
            DocumentKind::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(DocumentKind::Png)
        );
        assert_eq!(
            DocumentKind::sniff(&[0x42, 0x4D, 0x36, 0x00]),
            Some(DocumentKind::Bmp)
        );
        assert_eq!(DocumentKind::sniff(b"GIF89a"), None);
        assert_eq!(DocumentKind::sniff(b""), None);
    }

    #[test]
    fn extension_wins_over_signature() {
        // PNG bytes with a .pdf name classify as PDF.
        let png = [0x89, 0x50, 0x4E, 0x47];
        assert_eq!(
            classify(Some("scan.pdf"), &png).unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(classify(Some("a.JPEG"), b"").unwrap(), DocumentKind::Jpeg);
        assert_eq!(classify(Some("b.Png"), b"").unwrap(), DocumentKind::Png);
    }

    #[test]
    fn unrecognised_extension_falls_back_to_sniffing() {
        assert_eq!(
            classify(Some("upload.bin"), b"%PDF-1.4").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn unknown_input_is_unsupported() {
        let err = classify(None, b"GIF89a").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat));

        let err = classify(Some("noext"), &[0x00, 0x01]).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat));
    }

    #[test]
    fn materialize_uses_canonical_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = materialize(b"%PDF-1.4", DocumentKind::Pdf, dir.path()).unwrap();
        assert!(path.ends_with("input.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }
}
