//! Configuration for a document-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`] or loaded from the environment with
//! [`ConversionConfig::from_env`]. Keeping every knob in one struct makes it
//! trivial to share configs, log them, and diff two runs to understand why
//! their outputs differ.

use crate::error::ConvertError;
use crate::pipeline::pages::PageRange;
use std::fmt;

/// Default chat-completion endpoint when `OPENAI_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// Default model when neither the config nor `OPENAI_DEFAULT_MODEL` names one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Configuration for a conversion run.
///
/// # Example
/// ```rust
/// use markpdfdown::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .api_key("sk-test")
///     .model("gpt-4o-mini")
///     .max_retries(5)
///     .build();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// API key sent as a bearer token on every completion call.
    pub api_key: String,

    /// Service base URL as supplied by the operator. Normalised by the
    /// completion client at construction time; any of `https://host`,
    /// `https://host/`, `https://host/v1`, `https://host/v1/models` work.
    pub base_url: String,

    /// Model identifier, e.g. "gpt-4o".
    pub model: String,

    /// Sampling temperature for page transcription. Default: 0.3.
    ///
    /// Transcription wants the model faithful to what it sees on the page,
    /// not creative.
    pub temperature: f32,

    /// Token budget per page response. Default: 8192.
    ///
    /// Dense pages (tables, code listings) run long; a low budget silently
    /// truncates the Markdown mid-sentence.
    pub max_tokens: u32,

    /// Completion attempts per page. Default: 3.
    ///
    /// When every attempt fails the page contributes an **empty fragment**
    /// and the run continues — a multi-hundred-page document does not fail
    /// entirely because one page's model call is flaky.
    pub max_retries: u32,

    /// Fixed wait between attempts in milliseconds. Default: 500.
    ///
    /// Flat back-off: no exponential growth, no jitter.
    pub retry_backoff_ms: u64,

    /// System instruction sent with every completion. Default: empty.
    pub system_prompt: String,

    /// Pages to convert. Default: the whole document.
    pub pages: PageRange,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
            system_prompt: String::new(),
            pages: PageRange::default(),
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The API key is deliberately omitted.
        f.debug_struct("ConversionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("pages", &self.pages)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load the configuration from the environment.
    ///
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_API_BASE` (optional,
    /// default [`DEFAULT_API_BASE`]) and `OPENAI_DEFAULT_MODEL` (optional,
    /// default [`DEFAULT_MODEL`]).
    ///
    /// # Errors
    /// [`ConvertError::MissingApiKey`] when `OPENAI_API_KEY` is absent or
    /// empty. This is checked before any work begins.
    pub fn from_env() -> Result<Self, ConvertError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConvertError::MissingApiKey)?;

        let base_url = std::env::var("OPENAI_API_BASE")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = std::env::var("OPENAI_DEFAULT_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
            ..Self::default()
        })
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn pages(mut self, range: PageRange) -> Self {
        self.config.pages = range;
        self
    }

    /// Finish the builder.
    pub fn build(self) -> ConversionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = ConversionConfig::default();
        assert_eq!(c.base_url, "https://api.openai.com");
        assert_eq!(c.model, "gpt-4o");
        assert_eq!(c.temperature, 0.3);
        assert_eq!(c.max_tokens, 8192);
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.retry_backoff_ms, 500);
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ConversionConfig::builder().temperature(5.0).build();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn debug_hides_api_key() {
        let c = ConversionConfig::builder().api_key("sk-secret").build();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
    }
}
