//! CLI binary for markpdfdown.
//!
//! A thin shim over the library crate: resolves the positional-argument
//! contract, loads configuration from the environment, runs the conversion,
//! and writes the Markdown. This is the **only** place that decides on exit
//! behaviour — library components report fatal errors as `ConvertError` and
//! never terminate the process themselves.

use clap::Parser;
use markpdfdown::{convert_bytes, ConversionConfig, ConvertError, PageRange};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a PDF to stdout
  markpdfdown document.pdf

  # Convert to a file
  markpdfdown document.pdf output.md

  # Pages 3 to 7 only
  markpdfdown document.pdf output.md 3 7

  # Read the document from stdin, pages 2 onwards
  markpdfdown 2 < document.pdf > output.md

  # Single images work too (JPEG, PNG, BMP)
  markpdfdown scan.png output.md

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        API key (required)
  OPENAI_API_BASE       Service base URL (default: https://api.openai.com)
  OPENAI_DEFAULT_MODEL  Model ID (default: gpt-4o)

OpenAI-compatible gateways (OpenRouter, Ollama, vLLM, LiteLLM, ...) work by
pointing OPENAI_API_BASE at them; the /v1 suffix is added automatically.
"#;

/// Convert PDF and image documents to Markdown using multimodal LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "markpdfdown",
    version,
    about = "Convert PDF and image documents to Markdown using multimodal LLMs",
    long_about = "Convert a PDF or single-image document to Markdown by rendering each page \
and asking a vision-capable model to transcribe it. Reads the document from a path argument \
or from standard input.",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// `[input] [output.md] [start] [end]`, or `[start] [end]` with the
    /// document on standard input.
    #[arg(value_name = "ARG")]
    args: Vec<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MARKPDFDOWN_VERBOSE")]
    verbose: bool,
}

/// The positional arguments, disambiguated.
#[derive(Debug, PartialEq, Eq)]
struct ArgPlan {
    /// Document path; `None` means read standard input.
    input: Option<PathBuf>,
    /// Markdown output path; `None` means print to stdout.
    output: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
}

/// Disambiguate the positional arguments.
///
/// The first argument is the input document when it names an existing file
/// or ends in `.pdf`; otherwise every argument is a page number and the
/// document arrives on stdin. In path mode, a second argument ending in
/// `.md` is the output path; the remaining positionals are start/end pages.
fn resolve_args(args: &[String]) -> ArgPlan {
    let mut plan = ArgPlan {
        input: None,
        output: None,
        start: None,
        end: None,
    };

    let Some(first) = args.first() else {
        return plan;
    };

    if Path::new(first).is_file() || first.ends_with(".pdf") {
        plan.input = Some(PathBuf::from(first));
        let mut rest = &args[1..];
        if let Some(second) = rest.first() {
            if second.ends_with(".md") {
                plan.output = Some(PathBuf::from(second));
                rest = &rest[1..];
            }
        }
        plan.start = rest.first().cloned();
        plan.end = rest.get(1).cloned();
    } else {
        plan.start = Some(first.clone());
        plan.end = args.get(1).cloned();
    }

    plan
}

async fn run(cli: Cli) -> Result<(), ConvertError> {
    let plan = resolve_args(&cli.args);

    // Page arguments fail before any rendering work.
    let pages = PageRange::resolve(plan.start.as_deref(), plan.end.as_deref())?;

    // Missing credentials fail before any work at all.
    let mut config = ConversionConfig::from_env()?;
    config.pages = pages;

    let (bytes, filename) = match plan.input {
        Some(ref path) => {
            let bytes =
                tokio::fs::read(path)
                    .await
                    .map_err(|e| ConvertError::UnreadableInput {
                        path: path.clone(),
                        detail: e.to_string(),
                    })?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            (bytes, name)
        }
        None => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| ConvertError::Internal(format!("failed to read stdin: {e}")))?;
            if bytes.is_empty() {
                return Err(ConvertError::EmptyInput);
            }
            (bytes, None)
        }
    };

    let markdown = convert_bytes(&bytes, filename.as_deref(), &config).await?;

    match plan.output {
        Some(ref path) => {
            std::fs::write(path, &markdown).map_err(|e| ConvertError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
            info!("Markdown saved to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(markdown.as_bytes())
                .map_err(|e| ConvertError::OutputWriteFailed {
                    path: PathBuf::from("<stdout>"),
                    source: e,
                })?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for Markdown output.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        error!("{err}");
        std::process::exit(1);
    }
}
