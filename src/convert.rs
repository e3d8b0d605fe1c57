//! Top-level conversion entry points.
//!
//! The whole pipeline in one place: classify → resolve pages → materialise →
//! render → transcribe sequentially → assemble → clean up. Pages are
//! processed strictly one at a time in ascending order; the only suspension
//! points are retry back-off sleeps and network I/O inside the completion
//! call.
//!
//! Resource scope is the **whole run**: one work directory under
//! `output/<timestamp>/` holds the materialised input and every rendered
//! page, and is removed recursively at the end of the run. A fatal error
//! aborts before any Markdown is produced (and may leave the work directory
//! behind for inspection); exhausted per-page retries are not fatal and
//! still reach the cleanup.

use crate::client::{ChatCompletion, CompletionClient};
use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::pipeline::{assemble, input, llm, render};
use std::path::Path;
use tracing::{info, warn};

/// Convert raw document bytes to Markdown.
///
/// `filename`, when known, contributes its extension to classification;
/// byte-signature sniffing covers the stdin case.
///
/// # Errors
/// Fatal errors only — unsupported format, empty input, renderer rejection,
/// out-of-range pages. Exhausted per-page retries degrade to empty
/// fragments instead (see [`crate::pipeline::llm`]).
pub async fn convert_bytes(
    bytes: &[u8],
    filename: Option<&str>,
    config: &ConversionConfig,
) -> Result<String, ConvertError> {
    if bytes.is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let kind = input::classify(filename, bytes)?;
    let workdir = input::create_workdir()?;
    let doc_path = input::materialize(bytes, kind, &workdir)?;

    let worker = render::create_worker(&doc_path, kind, config.pages, &workdir)?;
    let mut page_paths = worker.render().await?;
    info!("Image conversion completed: {} pages", page_paths.len());

    // The collaborator's return order is not trusted. Lexicographic sort:
    // with unpadded names page_10 precedes page_2, and the transcription
    // order follows the sorted file names exactly.
    page_paths.sort();

    let client = CompletionClient::new(config);
    let fragments = llm::transcribe_pages(&client as &dyn ChatCompletion, &page_paths, config).await;
    let markdown = assemble::assemble(&fragments);
    info!("Image conversion to Markdown completed");

    if let Err(e) = std::fs::remove_dir_all(&workdir) {
        warn!("Failed to remove work directory {}: {e}", workdir.display());
    }

    Ok(markdown)
}

/// Convert a document file to Markdown.
///
/// Reads the file and delegates to [`convert_bytes`], passing the file name
/// so a recognised extension can classify the document without sniffing.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ConvertError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ConvertError::UnreadableInput {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let filename = path.file_name().and_then(|n| n.to_str());
    convert_bytes(&bytes, filename, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    #[tokio::test]
    async fn empty_input_is_fatal() {
        let config = ConversionConfig::builder().api_key("sk-test").build();
        let err = convert_bytes(b"", None, &config).await.unwrap_err();
        assert!(matches!(err, ConvertError::EmptyInput));
    }

    #[tokio::test]
    async fn unrecognised_bytes_are_fatal() {
        let config = ConversionConfig::builder().api_key("sk-test").build();
        let err = convert_bytes(b"GIF89a...", None, &config).await.unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat));
    }

    #[tokio::test]
    async fn missing_file_is_unreadable_input() {
        let config = ConversionConfig::builder().api_key("sk-test").build();
        let err = convert_file("no/such/file.pdf", &config).await.unwrap_err();
        assert!(matches!(err, ConvertError::UnreadableInput { .. }));
    }
}
