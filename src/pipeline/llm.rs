//! Per-page transcription with bounded retry.
//!
//! ## Retry policy
//!
//! Each page gets a fixed budget of attempts (default 3) with a flat wait
//! between them — no exponential growth, no jitter. When the budget is
//! exhausted the page degrades to an **empty fragment** and the run
//! continues. This is a deliberate completeness/availability trade-off:
//! one flaky model call must not sink a multi-hundred-page document.
//! Callers that need completeness check for empty fragments themselves.
//!
//! ## Sequencing
//!
//! Pages are processed strictly one at a time in ascending order. There is
//! no fan-out across pages or attempts, and no cancellation: a page's retry
//! loop runs to success or exhaustion before the next page starts.

use crate::client::{ChatCompletion, CompletionRequest};
use crate::config::ConversionConfig;
use crate::prompts::PAGE_TRANSCRIPTION_PROMPT;
use std::path::Path;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Transcribe one rendered page image to Markdown.
///
/// Returns the raw model response on the first successful attempt, or an
/// empty string once all attempts fail. Never returns an error: per-page
/// failures are logged, not propagated.
pub async fn transcribe_page(
    backend: &dyn ChatCompletion,
    image_path: &Path,
    config: &ConversionConfig,
) -> String {
    let request = CompletionRequest {
        user_message: PAGE_TRANSCRIPTION_PROMPT.to_string(),
        system_prompt: config.system_prompt.clone(),
        image_path: Some(image_path.to_path_buf()),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    for _ in 0..config.max_retries {
        match backend.complete(&request).await {
            Ok(response) => return response,
            Err(e) => {
                error!("LLM call failed: {e}");
                sleep(Duration::from_millis(config.retry_backoff_ms)).await;
            }
        }
    }

    String::new()
}

/// Transcribe every page in order, one at a time.
///
/// `paths` must already be sorted; the returned fragments are positionally
/// aligned with it. Exhausted pages yield empty fragments.
pub async fn transcribe_pages(
    backend: &dyn ChatCompletion,
    paths: &[impl AsRef<Path>],
    config: &ConversionConfig,
) -> Vec<String> {
    let mut fragments = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        info!("Converting image {} to Markdown", path.display());
        fragments.push(transcribe_page(backend, path, config).await);
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that fails a fixed number of times before succeeding.
    struct FlakyBackend {
        failures_before_success: usize,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(failures_before_success: usize) -> Self {
            Self {
                failures_before_success,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatCompletion for FlakyBackend {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ConvertError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures_before_success {
                Err(ConvertError::Api {
                    message: format!("transient failure #{}", attempt + 1),
                })
            } else {
                Ok("# Recovered".to_string())
            }
        }
    }

    fn fast_config() -> ConversionConfig {
        ConversionConfig::builder()
            .api_key("sk-test")
            .retry_backoff_ms(1)
            .build()
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let backend = FlakyBackend::new(0);
        let out = transcribe_page(&backend, Path::new("page_1.png"), &fast_config()).await;
        assert_eq!(out, "# Recovered");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_on_third_attempt() {
        let backend = FlakyBackend::new(2);
        let out = transcribe_page(&backend, Path::new("page_1.png"), &fast_config()).await;
        assert_eq!(out, "# Recovered");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_degrades_to_empty_fragment() {
        let backend = FlakyBackend::new(usize::MAX);
        let out = transcribe_page(&backend, Path::new("page_1.png"), &fast_config()).await;
        assert_eq!(out, "");
        // The full budget was spent, no more.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        // With the virtual clock paused, the run only completes if exactly
        // two back-off sleeps separate the three attempts.
        let backend = FlakyBackend::new(2);
        let config = ConversionConfig::builder()
            .api_key("sk-test")
            .retry_backoff_ms(500)
            .build();

        let start = tokio::time::Instant::now();
        let out = transcribe_page(&backend, Path::new("page_1.png"), &config).await;
        assert_eq!(out, "# Recovered");
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn pages_processed_in_given_order() {
        struct EchoBackend;

        #[async_trait]
        impl ChatCompletion for EchoBackend {
            async fn complete(&self, request: &CompletionRequest) -> Result<String, ConvertError> {
                Ok(request
                    .image_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default())
            }
        }

        let paths = vec![
            PathBuf::from("page_1.png"),
            PathBuf::from("page_10.png"),
            PathBuf::from("page_2.png"),
        ];
        let fragments = transcribe_pages(&EchoBackend, &paths, &fast_config()).await;
        assert_eq!(fragments, vec!["page_1.png", "page_10.png", "page_2.png"]);
    }
}
