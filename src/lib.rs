//! # markpdfdown
//!
//! Convert PDF and image documents to Markdown using multimodal LLMs.
//!
//! ## Why this crate?
//!
//! Traditional PDF-to-text tools (pdftotext, pdf-extract) fail on complex
//! layouts — multi-column text, mathematical symbols, and tables come out
//! garbled or out of reading order. Instead this crate rasterises each page
//! into an image and lets a vision model read it as a human would, producing
//! Markdown that preserves structure, tables, and formulae.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (PDF / JPEG / PNG / BMP)
//!  │
//!  ├─ 1. Classify  extension, or byte-signature sniffing for stdin
//!  ├─ 2. Pages     resolve start/end into an inclusive 1-based range
//!  ├─ 3. Render    rasterise pages via pdfium into output/<timestamp>/
//!  ├─ 4. LLM       one completion per page, 3 attempts, flat 500 ms back-off
//!  └─ 5. Assemble  unwrap stray ```markdown fences, join pages in order
//! ```
//!
//! A page whose completion attempts are all exhausted contributes an empty
//! fragment rather than failing the run — a deliberate
//! completeness/availability trade-off for long documents.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markpdfdown::{convert_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY, OPENAI_API_BASE, OPENAI_DEFAULT_MODEL
//!     let config = ConversionConfig::from_env()?;
//!     let markdown = convert_file("document.pdf", &config).await?;
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `markpdfdown` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! markpdfdown = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{ChatCompletion, CompletionClient, CompletionRequest, Provider};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_bytes, convert_file};
pub use error::ConvertError;
pub use pipeline::input::DocumentKind;
pub use pipeline::pages::PageRange;
