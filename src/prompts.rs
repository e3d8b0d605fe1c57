//! Prompts for page transcription.
//!
//! Centralising the prompt here means changing the transcription behaviour
//! requires editing exactly one place, and unit tests can inspect it without
//! a live model call.

/// Instruction sent with every page image.
///
/// The model is asked to transcribe — not summarise, not explain. Formulas
/// go to LaTeX so downstream renderers can typeset them, and the closing
/// rule keeps the model from prepending commentary we would only have to
/// strip again.
pub const PAGE_TRANSCRIPTION_PROMPT: &str = "\
Please read the content in the image and transcribe it into plain Markdown format. Please note:
1. Maintain the format of headings, text, formulas, and table rows and columns
2. Mathematical formulas should be transcribed using LaTeX syntax, ensuring consistency with the original
3. No additional explanation is needed, and no content outside the original text should be added.
";
