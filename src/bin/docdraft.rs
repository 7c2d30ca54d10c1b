//! CLI binary for docdraft.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig`, simulates the upload intake by spooling the input
//! file, and prints the resulting draft.

use anyhow::{Context, Result};
use clap::Parser;
use docdraft::{
    process_bytes, ChunkSeparator, ProcessingConfig, ProcessingProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar, one log line per chunk.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos}/{len} sections  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Processing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ProcessingProgressCallback for CliProgressCallback {
    fn on_processing_start(&self, total_chunks: usize) {
        self.bar.set_length(total_chunks as u64);
    }

    fn on_chunk_complete(&self, index: usize, total: usize, output_len: usize) {
        self.bar.println(format!(
            "  {} Section {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{output_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, index: usize, total: usize, error: String) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Section {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_processing_complete(&self, total_chunks: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_chunks.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} sections processed",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} sections processed  ({} failed)",
                red("⚠"),
                bold(&success_count.to_string()),
                total_chunks,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a document (draft Markdown to stdout)
  docdraft notes.txt -i "summarize as meeting notes"

  # Instructions from a file, draft to a file
  docdraft export.md -i @instructions.txt -o draft.md

  # Full draft (title, tags, summary, stats) as JSON
  docdraft report.txt -i "rewrite as a runbook" --json

  # Use a specific provider and model
  docdraft notes.txt -i "summarize" --provider openai --model gpt-4.1-mini

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
"#;

/// Transform a document into a structured Markdown draft using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docdraft",
    version,
    about = "Transform a document into a structured Markdown draft using an LLM",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document (plain-text formats: txt, md, csv, json, html, …).
    input: PathBuf,

    /// Processing instructions, or @path to read them from a file.
    #[arg(short, long)]
    instructions: String,

    /// Write the draft content to this file instead of stdout.
    #[arg(short, long, env = "DOCDRAFT_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "DOCDRAFT_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "DOCDRAFT_PROVIDER")]
    provider: Option<String>,

    /// Estimated-token budget per chunk.
    #[arg(long, env = "DOCDRAFT_CHUNK_BUDGET", default_value_t = 3000)]
    chunk_budget: usize,

    /// Estimated-token ceiling for the single-call path.
    #[arg(long, env = "DOCDRAFT_SMALL_BUDGET", default_value_t = 2500)]
    small_budget: usize,

    /// Max output tokens per chunk call.
    #[arg(long, default_value_t = 1500)]
    chunk_output_tokens: usize,

    /// Delay between consecutive chunk calls in milliseconds.
    #[arg(long, env = "DOCDRAFT_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Section separator: hr, blank, comment, or a custom string.
    #[arg(long, default_value = "hr")]
    separator: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Output the full ProcessingOutput as JSON instead of draft Markdown.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the draft itself.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the feedback that matters; keep library
    // logs quiet unless asked.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Read inputs ──────────────────────────────────────────────────────
    let instructions = if let Some(path) = cli.instructions.strip_prefix('@') {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instructions from '{path}'"))?
    } else {
        cli.instructions.clone()
    };

    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read input file '{}'", cli.input.display()))?;
    let original_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let mut builder = ProcessingConfig::builder()
        .max_tokens_per_chunk(cli.chunk_budget)
        .small_doc_budget(cli.small_budget)
        .chunk_output_tokens(cli.chunk_output_tokens)
        .inter_call_delay_ms(cli.delay_ms)
        .temperature(cli.temperature)
        .separator(parse_separator(&cli.separator));
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(provider) = &cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    // The library owns (and deletes) a temp copy; the user's file is untouched.
    let output = process_bytes(&bytes, &original_name, &instructions, &config)
        .await
        .context("Processing failed")?;

    // ── Emit results ─────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if let Some(ref path) = cli.output {
        tokio::fs::write(path, &output.draft.content)
            .await
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                bold(&output.draft.title),
                bold(&path.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.draft.content.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {}  {} estimated tokens  /  {} chunks ({} failed)  —  {}ms total",
            dim(&format!("{:?}", output.stats.route)),
            dim(&output.stats.estimated_tokens.to_string()),
            output.stats.total_chunks,
            output.stats.failed_chunks,
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Parse `--separator` into a `ChunkSeparator`.
fn parse_separator(s: &str) -> ChunkSeparator {
    match s.to_lowercase().as_str() {
        "hr" | "---" => ChunkSeparator::HorizontalRule,
        "blank" | "none" => ChunkSeparator::Blank,
        "comment" => ChunkSeparator::Comment,
        custom => ChunkSeparator::Custom(custom.to_string()),
    }
}
