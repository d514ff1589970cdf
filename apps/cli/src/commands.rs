//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use skillpack_core::pipeline::{BuildPackResult, ProgressReporter, build_pack};
use skillpack_shared::{AppConfig, CompileConfig, LanguageMode, init_config, load_config};
use skillpack_storage::OutputStore;
use skillpack_text::Lexicon;

use crate::extract::read_sources;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// skillpack: compile documents into routed skill packs.
#[derive(Parser)]
#[command(
    name = "skillpack",
    version,
    about = "Compile PDF or text documents into skill packs with routing metadata.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Compile input documents into a skill pack (folder + zip).
    Compile {
        /// Input files (.pdf or plain text).
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Skill pack name (sanitized into the output directory name).
        #[arg(short, long)]
        name: String,

        /// Language mode: auto, zh, or en.
        #[arg(long)]
        lang: Option<LanguageMode>,

        /// Maximum number of skill items.
        #[arg(long)]
        max_chunks: Option<usize>,

        /// Advisory score cutoff recorded in the routing data (0-100).
        #[arg(long)]
        min_score: Option<u8>,

        /// Output root directory (defaults to config `output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete packs and staging areas older than the retention TTL.
    Sweep {
        /// Output root directory.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Override the retention TTL in hours.
        #[arg(long)]
        ttl_hours: Option<u64>,
    },

    /// List published skill packs.
    List {
        /// Output root directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "skillpack=info",
        1 => "skillpack=debug",
        _ => "skillpack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compile {
            inputs,
            name,
            lang,
            max_chunks,
            min_score,
            out,
        } => {
            let overrides = CompileOverrides {
                lang,
                max_chunks,
                min_score,
            };
            cmd_compile(&inputs, &name, overrides, out).await
        }
        Command::Sweep { out, ttl_hours } => cmd_sweep(out, ttl_hours),
        Command::List { out } => cmd_list(out),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Flag values that take precedence over the config file.
struct CompileOverrides {
    lang: Option<LanguageMode>,
    max_chunks: Option<usize>,
    min_score: Option<u8>,
}

fn compile_config(config: &AppConfig, name: &str, overrides: CompileOverrides) -> CompileConfig {
    let mut compile = CompileConfig::from(config);
    compile.skill_name = name.to_string();
    if let Some(lang) = overrides.lang {
        compile.language = lang;
    }
    if let Some(max_chunks) = overrides.max_chunks {
        compile.max_chunks = max_chunks;
    }
    if let Some(min_score) = overrides.min_score {
        compile.min_score = min_score;
    }
    compile
}

fn open_store(config: &AppConfig, out: Option<PathBuf>, ttl_hours: Option<u64>) -> Result<OutputStore> {
    let root = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let hours = ttl_hours.unwrap_or(config.retention.ttl_hours);
    Ok(OutputStore::open(root, Duration::from_secs(hours * 3600))?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_compile(
    inputs: &[PathBuf],
    name: &str,
    overrides: CompileOverrides,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let compile = compile_config(&config, name, overrides);
    compile.validate()?;

    let lexicon = Lexicon::from_config(&config.lexicon)?;
    let store = open_store(&config, out, None)?;

    info!(
        inputs = inputs.len(),
        name,
        language = %compile.language,
        max_chunks = compile.max_chunks,
        "compiling skill pack"
    );

    let reporter = CliProgress::new();
    reporter.phase("Extracting text");
    let sources = match read_sources(inputs).await {
        Ok(sources) => sources,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    // The compile is CPU-bound and synchronous.
    let result = tokio::task::spawn_blocking(move || {
        let outcome = build_pack(&compile, &sources, &lexicon, &store, &reporter);
        if outcome.is_err() {
            reporter.spinner.finish_and_clear();
        }
        outcome
    })
    .await
    .map_err(|e| eyre!("compile task failed: {e}"))??;

    // Print summary
    println!();
    println!("  Skill pack compiled successfully!");
    println!("  Name:      {}", result.name);
    println!("  Skills:    {}", result.item_count);
    println!("  Links:     {}", result.edge_count);
    println!("  Language:  {}", result.language);
    println!("  Files:     {}", result.artifacts.len());
    println!("  Folder:    {}", result.folder.display());
    println!("  Zip:       {}", result.zip.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_sweep(out: Option<PathBuf>, ttl_hours: Option<u64>) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, out, ttl_hours)?;
    let report = store.sweep(chrono::Utc::now())?;

    println!();
    println!("  Sweep complete ({})", store.root().display());
    println!("  Packs removed:    {}", report.removed_packs.len());
    for name in &report.removed_packs {
        println!("    - {name}");
    }
    println!("  Staging cleared:  {}", report.removed_staging);
    if !report.skipped_locked.is_empty() {
        println!("  Skipped (in use): {}", report.skipped_locked.join(", "));
    }
    println!();

    Ok(())
}

fn cmd_list(out: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, out, None)?;
    let packs = store.list()?;

    if packs.is_empty() {
        println!("No skill packs in {}", store.root().display());
        return Ok(());
    }

    let now = chrono::Utc::now();
    println!("{:<32} {:<5} {:>8}", "NAME", "ZIP", "AGE");
    for pack in packs {
        let age = now.signed_duration_since(pack.modified);
        println!(
            "{:<32} {:<5} {:>7}h",
            pack.name,
            if pack.zip.is_some() { "yes" } else { "no" },
            age.num_hours().max(0),
        );
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid progress template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn chunk_compiled(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Compiling skills [{current}/{total}]"));
    }

    fn done(&self, _result: &BuildPackResult) {
        self.spinner.finish_and_clear();
    }
}
