//! Pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pages ──▶ render ──▶ llm ──▶ assemble
//! (classify) (range)  (pdfium)   (VLM)   (fences + join)
//! ```
//!
//! 1. [`input`]    — classify the document from its extension or leading
//!    bytes and materialise it to the per-run work area
//! 2. [`pages`]    — resolve the user-supplied start/end arguments into an
//!    inclusive 1-based page range
//! 3. [`render`]   — rasterise the selected pages to image files; pdfium is
//!    not async-safe, so PDF work runs in `spawn_blocking`
//! 4. [`llm`]      — one completion call per page with bounded retry; the
//!    only stage with network I/O
//! 5. [`assemble`] — unwrap stray ```markdown fences and concatenate the
//!    fragments in page order

pub mod assemble;
pub mod input;
pub mod llm;
pub mod pages;
pub mod render;
