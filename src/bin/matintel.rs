//! CLI binary for material-intel.
//!
//! A thin shim over the library crate: flags map to `AdvisorConfig`, each
//! subcommand calls one `Advisor` operation and prints or writes the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use material_intel::charts::encode::to_data_uri;
use material_intel::{
    generate_charts, Advisor, AdvisorConfig, BackendSpec, ChartKind, ChatSession, JsonFileStore,
    ReportData, Role, SessionStore,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Spinner shown while waiting on the model or the renderers.
fn spinner(enabled: bool, message: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start an interview and chat interactively
  matintel new
  matintel chat 6f1c2d9e-...

  # One-shot turn
  matintel chat 6f1c2d9e-... "I need a metal for an outdoor marine bracket"

  # Engineering report and a single chart
  matintel report 6f1c2d9e-... -o report.pdf
  matintel chart radar 6f1c2d9e-... -o radar.png

  # Render charts from a saved report JSON (no API key needed)
  matintel render report.json --out-dir charts/

  # Use other backends, highest priority first
  matintel --backends openai:gpt-4.1-mini,anthropic:claude-sonnet-4-20250514 chat 6f1c...

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default backends)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  MATINTEL_BACKENDS       Comma-separated provider:model priority list
  MATINTEL_SESSION_DIR    Session directory (default: .sessions)
  PDFIUM_LIB_PATH         Path to libpdfium (directory or file), for `report`
  RUST_LOG                Log filter, e.g. material_intel=debug
"#;

/// Interview-driven material selection with comparison charts and PDF reports.
#[derive(Parser, Debug)]
#[command(
    name = "matintel",
    version,
    about = "Interview-driven material selection with comparison charts and PDF reports",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Priority-ordered chat backends as provider:model, comma separated.
    #[arg(long, global = true, env = "MATINTEL_BACKENDS")]
    backends: Option<String>,

    /// Directory holding the session documents.
    #[arg(long, global = true, env = "MATINTEL_SESSION_DIR", default_value = ".sessions")]
    session_dir: PathBuf,

    /// Path to libpdfium (directory or library file).
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "MATINTEL_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens per reply.
    #[arg(long, global = true, env = "MATINTEL_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Attempts per request across all backends.
    #[arg(long, global = true, env = "MATINTEL_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,

    /// Backoff base in milliseconds when the only backend is rate limited.
    #[arg(long, global = true, env = "MATINTEL_RETRY_BACKOFF_MS", default_value_t = 2000)]
    retry_backoff_ms: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MATINTEL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "MATINTEL_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty session and print its id.
    New,

    /// List sessions, newest first.
    Sessions,

    /// Print a session transcript.
    Show { id: String },

    /// Send a message, or chat interactively when no message is given.
    Chat { id: String, message: Option<String> },

    /// Write the engineering report as PDF.
    Report {
        id: String,

        #[arg(short, long, default_value = "material_report.pdf")]
        output: PathBuf,

        /// Also print the extracted report data as JSON.
        #[arg(long)]
        data: bool,
    },

    /// Write one chart (tensile, density, radar) as PNG.
    Chart {
        kind: ChartKind,

        id: String,

        #[arg(short, long, conflicts_with = "data_uri")]
        output: Option<PathBuf>,

        /// Print the chart as a `data:image/png;base64,...` URI instead.
        #[arg(long)]
        data_uri: bool,
    },

    /// Render every chart of a saved report JSON; no model is called.
    Render {
        input: PathBuf,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let show_progress = !cli.quiet && !cli.verbose;

    match &cli.command {
        Command::New => {
            let store = open_store(&config).await?;
            let session = store.create().await.context("Failed to create session")?;
            println!("{}", session.id);
            if !cli.quiet {
                eprintln!("{} Session created. Next: matintel chat {}", green("✔"), session.id);
            }
        }

        Command::Sessions => {
            let store = open_store(&config).await?;
            let sessions = store.list().await.context("Failed to list sessions")?;
            if sessions.is_empty() && !cli.quiet {
                eprintln!("No sessions in {}", config.session_dir.display());
            }
            for s in sessions {
                println!(
                    "{}  {}  {}",
                    s.id,
                    dim(&s.created_at.format("%Y-%m-%d %H:%M").to_string()),
                    s.title
                );
            }
        }

        Command::Show { id } => {
            let store = open_store(&config).await?;
            let session = store
                .get(id)
                .await
                .with_context(|| format!("Failed to load session {id}"))?;
            print_transcript(&session);
        }

        Command::Chat { id, message } => {
            let advisor = open_advisor(&config).await?;
            match message {
                Some(text) => {
                    let reply = ask(&advisor, id, text, show_progress).await?;
                    println!("{reply}");
                }
                None => chat_loop(&advisor, id, show_progress).await?,
            }
        }

        Command::Report { id, output, data } => {
            let advisor = open_advisor(&config).await?;
            let bar = spinner(show_progress, "Extracting report data…");
            let report = advisor.report_data(id).await;
            bar.set_message("Composing PDF…");
            let pdf = match report {
                Ok(report) => {
                    if *data {
                        bar.suspend(|| print_json(&report))?;
                    }
                    advisor.report_pdf(id).await
                }
                Err(e) => Err(e),
            };
            bar.finish_and_clear();
            let pdf = pdf.context("Report generation failed")?;

            write_file(output, &pdf).await?;
            if !cli.quiet {
                eprintln!(
                    "{} Report written  {}  →  {}",
                    green("✔"),
                    dim(&format!("{} bytes", pdf.len())),
                    bold(&output.display().to_string())
                );
            }
        }

        Command::Chart {
            kind,
            id,
            output,
            data_uri,
        } => {
            let advisor = open_advisor(&config).await?;
            let bar = spinner(show_progress, &format!("Rendering {kind} chart…"));
            let png = advisor.chart(id, *kind).await;
            bar.finish_and_clear();
            let png = png.with_context(|| format!("Failed to render the {kind} chart"))?;

            if *data_uri {
                println!("{}", to_data_uri(&png));
                return Ok(());
            }
            let output = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{kind}.png")));
            write_file(&output, &png).await?;
            if !cli.quiet {
                eprintln!("{} {}", green("✔"), bold(&output.display().to_string()));
            }
        }

        Command::Render { input, out_dir } => {
            let raw = tokio::fs::read_to_string(input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let report: ReportData = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a report JSON document", input.display()))?;

            let style = config.chart_style;
            let charts = tokio::task::spawn_blocking(move || generate_charts(&report, &style))
                .await
                .context("Chart task panicked")?
                .context("Chart rendering failed")?;

            if charts.is_empty() && !cli.quiet {
                eprintln!("Not enough data to generate charts.");
            }
            for (kind, png) in charts.iter() {
                let path = out_dir.join(format!("{kind}.png"));
                write_file(&path, png).await?;
                if !cli.quiet {
                    eprintln!("{} {}", green("✔"), path.display());
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `AdvisorConfig`.
fn build_config(cli: &Cli) -> Result<AdvisorConfig> {
    let mut builder = AdvisorConfig::builder()
        .session_dir(&cli.session_dir)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_attempts(cli.max_attempts)
        .retry_backoff_ms(cli.retry_backoff_ms);

    if let Some(ref list) = cli.backends {
        let specs = BackendSpec::parse_list(list).context("Invalid --backends")?;
        builder = builder.backends(specs);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid configuration")
}

async fn open_store(config: &AdvisorConfig) -> Result<JsonFileStore> {
    JsonFileStore::open(&config.session_dir)
        .await
        .with_context(|| format!("Failed to open session directory {}", config.session_dir.display()))
}

async fn open_advisor(config: &AdvisorConfig) -> Result<Advisor> {
    Advisor::from_config(config)
        .await
        .context("Failed to initialise the advisor")
}

async fn ask(advisor: &Advisor, id: &str, text: &str, show_progress: bool) -> Result<String> {
    let bar = spinner(show_progress, "Thinking…");
    let reply = advisor.send_message(id, text).await;
    bar.finish_and_clear();
    reply.context("Chat request failed")
}

async fn chat_loop(advisor: &Advisor, id: &str, show_progress: bool) -> Result<()> {
    let session = advisor
        .get_session(id)
        .await
        .with_context(|| format!("Failed to load session {id}"))?;
    print_transcript(&session);
    eprintln!("{}", dim("Type your message; `exit` or `quit` leaves."));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", cyan("you ›"));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }

        match ask(advisor, id, text, show_progress).await {
            Ok(reply) => println!("\n{}\n{reply}\n", bold("agent ›")),
            Err(e) => eprintln!("{e:#}"),
        }
    }
    Ok(())
}

fn print_transcript(session: &ChatSession) {
    println!("{}  {}", bold(&session.title), dim(&session.id));
    for turn in &session.history {
        let speaker = match turn.role {
            Role::User => cyan("you ›"),
            Role::Assistant => bold("agent ›"),
        };
        println!("\n{speaker}\n{}", turn.content);
    }
}

fn print_json(report: &ReportData) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialise report data")?;
    println!("{json}");
    Ok(())
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
