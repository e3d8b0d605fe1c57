//! Chat-completion client for OpenAI-compatible services.
//!
//! Translates one page image plus a fixed transcription instruction into a
//! single model response string. The wire format is the `v1/chat/completions`
//! JSON dialect spoken by OpenAI and its many compatible gateways (Ollama,
//! vLLM, LiteLLM, OpenRouter, …).
//!
//! ## Endpoint normalisation
//!
//! Operators paste base URLs in every imaginable shape — with a trailing
//! slash, with `/v1` already present, or even a `/models` listing URL copied
//! from provider docs. [`normalize_base_url`] folds all of them onto the
//! versioned endpoint root so the client always calls
//! `<base>/v1/chat/completions`. The function is idempotent.
//!
//! ## Provider capabilities
//!
//! OpenRouter requires two extra headers identifying the calling application
//! for its routing/analytics. That capability is resolved **once** at client
//! construction into a [`Provider`] descriptor rather than re-checked on
//! every call.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// OpenRouter application headers, sent verbatim for wire compatibility.
const OPENROUTER_TITLE: (&str, &str) = ("X-Title", "MarkPDFdown");
const OPENROUTER_REFERER: (&str, &str) = ("HTTP-Referer", "https://github.com/jorben/markpdfdown");

/// A single chat-completion exchange for one page.
///
/// Built fresh per page, never reused. Exactly one system message (possibly
/// empty) and one user message; the user content starts with the text
/// instruction followed by zero-or-one image attachment.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The user-turn text instruction.
    pub user_message: String,
    /// System instruction, possibly empty. An empty string is still sent.
    pub system_prompt: String,
    /// Image to attach, base64-embedded as a data URI when present.
    pub image_path: Option<PathBuf>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget for the response.
    pub max_tokens: u32,
}

/// The seam between the retry orchestrator and the network.
///
/// Production code uses [`CompletionClient`]; tests substitute a scripted
/// backend so retry behaviour can be exercised without a live service.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Perform one completion. Transport and API-level failures are returned
    /// unmodified; no recovery happens at this layer.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ConvertError>;
}

/// Capability descriptor for the target service, resolved at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Plain OpenAI-compatible endpoint; no extra headers.
    Generic,
    /// OpenRouter aggregator; requests carry application-identity headers.
    OpenRouter,
}

impl Provider {
    /// Detect the provider from the normalised base URL.
    fn from_base_url(base_url: &str) -> Self {
        if base_url.to_ascii_lowercase().contains("openrouter.ai") {
            Provider::OpenRouter
        } else {
            Provider::Generic
        }
    }
}

/// Normalise an operator-supplied base URL onto the versioned endpoint root.
///
/// Three steps:
/// 1. truncate at any `/models` suffix (a listing URL pasted from docs),
/// 2. keep the URL as-is when it already ends in `/v1`,
/// 3. otherwise append `v1`, adding a separating slash only if absent.
pub fn normalize_base_url(base_url: &str) -> String {
    let mut url = base_url.to_string();
    if let Some(idx) = url.find("/models") {
        url.truncate(idx);
    }

    if url.ends_with("/v1") {
        url
    } else if url.ends_with('/') {
        format!("{url}v1")
    } else {
        format!("{url}/v1")
    }
}

/// Reqwest-backed chat-completion client.
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    provider: Provider,
}

impl CompletionClient {
    /// Build a client from the conversion config.
    ///
    /// Normalises the base URL and resolves the [`Provider`] descriptor once;
    /// per-call code never inspects the URL again.
    pub fn new(config: &ConversionConfig) -> Self {
        let base_url = normalize_base_url(&config.base_url);
        let provider = Provider::from_base_url(&base_url);
        info!("Using API base URL: {}", base_url);

        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            provider,
        }
    }

    /// The resolved provider descriptor.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Read and base64-encode an image as a `data:` URI.
    ///
    /// The MIME type is hard-coded to JPEG regardless of the image's true
    /// encoding — services decode the payload by content, and the permissive
    /// label keeps the request identical for every supported input kind.
    async fn encode_image(path: &Path) -> Result<String, ConvertError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ConvertError::UnreadableInput {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        let b64 = STANDARD.encode(&bytes);
        debug!("Encoded {} → {} bytes base64", path.display(), b64.len());
        Ok(format!("data:image/jpeg;base64,{b64}"))
    }

    /// Assemble the wire-format message list for one request.
    async fn build_messages(request: &CompletionRequest) -> Result<Vec<Message>, ConvertError> {
        let mut parts = vec![ContentPart::Text {
            text: request.user_message.clone(),
        }];
        if let Some(ref path) = request.image_path {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: Self::encode_image(path).await?,
                },
            });
        }

        Ok(vec![
            Message {
                role: "system",
                content: MessageContent::Text(request.system_prompt.clone()),
            },
            Message {
                role: "user",
                content: MessageContent::Parts(parts),
            },
        ])
    }
}

#[async_trait]
impl ChatCompletion for CompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ConvertError> {
        let body = ChatRequest {
            model: &self.model,
            messages: Self::build_messages(request).await?,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut http_request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);

        if self.provider == Provider::OpenRouter {
            http_request = http_request
                .header(OPENROUTER_TITLE.0, OPENROUTER_TITLE.1)
                .header(OPENROUTER_REFERER.0, OPENROUTER_REFERER.1);
        }

        let response = http_request.send().await.map_err(|e| {
            error!("API request failed: {e}");
            ConvertError::Api {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("API request failed: HTTP {status}: {detail}");
            return Err(ConvertError::Api {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!("API response decode failed: {e}");
            ConvertError::Api {
                message: e.to_string(),
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                error!("API response contained no choices");
                ConvertError::Api {
                    message: "response contained no choices".to_string(),
                }
            })
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_v1() {
        assert_eq!(normalize_base_url("https://host"), "https://host/v1");
    }

    #[test]
    fn normalize_respects_trailing_slash() {
        assert_eq!(normalize_base_url("https://host/"), "https://host/v1");
    }

    #[test]
    fn normalize_strips_models_suffix() {
        assert_eq!(
            normalize_base_url("https://host/v1/models"),
            "https://host/v1"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_base_url("https://api.openai.com");
        assert_eq!(normalize_base_url(&once), once);

        let router = normalize_base_url("https://openrouter.ai/api/v1/models");
        assert_eq!(normalize_base_url(&router), router);
    }

    #[test]
    fn provider_detected_from_host() {
        assert_eq!(
            Provider::from_base_url("https://openrouter.ai/api/v1"),
            Provider::OpenRouter
        );
        assert_eq!(
            Provider::from_base_url("https://OpenRouter.AI/api/v1"),
            Provider::OpenRouter
        );
        assert_eq!(
            Provider::from_base_url("https://api.openai.com/v1"),
            Provider::Generic
        );
    }

    #[test]
    fn client_resolves_provider_at_construction() {
        let config = ConversionConfig::builder()
            .api_key("sk-test")
            .base_url("https://openrouter.ai/api")
            .build();
        let client = CompletionClient::new(&config);
        assert_eq!(client.provider(), Provider::OpenRouter);
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
    }

    #[tokio::test]
    async fn messages_carry_system_then_user() {
        let request = CompletionRequest {
            user_message: "transcribe".into(),
            system_prompt: String::new(),
            image_path: None,
            temperature: 0.3,
            max_tokens: 8192,
        };
        let messages = CompletionClient::build_messages(&request)
            .await
            .expect("no image, cannot fail");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");

        let json = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "transcribe");
    }

    #[tokio::test]
    async fn image_attachment_uses_jpeg_data_uri() {
        // A PNG on disk still goes out labelled image/jpeg.
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("page_1.png");
        std::fs::write(&img, b"\x89PNG\r\n\x1a\nstub").unwrap();

        let request = CompletionRequest {
            user_message: "transcribe".into(),
            system_prompt: String::new(),
            image_path: Some(img),
            temperature: 0.3,
            max_tokens: 8192,
        };
        let messages = CompletionClient::build_messages(&request).await.unwrap();
        let json = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(json["content"][1]["type"], "image_url");
        let url = json["content"][1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"), "got: {url}");
    }
}
