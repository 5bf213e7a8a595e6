//! Kalike - vocabulary expertise tracking
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use kalike::cli::maintain::{MaintainAction, MaintainCommand, MaintainOptions};
use kalike::cli::record::{RecordCommand, RecordInput, RecordOptions};
use kalike::cli::stats::{StatsCommand, StatsOptions};
use kalike::cli::words::{WordSort, WordsCommand, WordsOptions};
use kalike::cli::resolve_vocabulary_size;
use kalike::config::{crash_log_path, kalike_home, Config};
use kalike::core::{LearnerSession, Principal};
use kalike::error::{exit_codes, FailOpen};
use kalike::stats::DocumentShape;
use kalike::storage::FileStatsStore;
use kalike::vocabulary::Vocabulary;

// =============================================================================
// CLI Definition
// =============================================================================

/// Kalike - time-decayed vocabulary expertise tracking
#[derive(Parser)]
#[command(name = "kalike")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Practice as this account instead of the local guest
    #[arg(long, global = true)]
    account: Option<String>,
    /// Vocabulary JSON file ([{"english": ..., "kannada": ...}])
    #[arg(long, global = true)]
    vocabulary: Option<PathBuf>,
    /// Vocabulary size for coverage (overrides the vocabulary file's length)
    #[arg(long, global = true)]
    vocabulary_size: Option<usize>,
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// [Practice] Record a graded answer for a word
    Record {
        /// English gloss of the word
        word: String,
        /// The answer was correct
        #[arg(long, conflicts_with = "wrong", required_unless_present = "wrong")]
        correct: bool,
        /// The answer was wrong
        #[arg(long)]
        wrong: bool,
    },

    /// [Practice] Reveal the answer for a word (counts as wrong)
    Reveal {
        /// English gloss of the word
        word: String,
    },

    /// [Practice] Check a typed answer against the vocabulary
    Check {
        /// English gloss of the word
        word: String,
        /// The typed Kannada answer
        answer: String,
    },

    /// [Practice] Count a completed game
    Game,

    /// [Progress] Show the current level
    Level,

    /// [Progress] Show answer counters and expertise
    Stats {
        /// Show the expertise breakdown
        #[arg(long, short)]
        detailed: bool,
    },

    /// [Progress] List attempted words, weakest first
    Words {
        /// Sort order
        #[arg(long, value_enum, default_value_t = SortArg::Expertise)]
        sort: SortArg,
        /// Only words that need practice
        #[arg(long)]
        practice: bool,
        /// Maximum number of words
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// [Maintenance] Evict, export, import, reset or list accounts
    Maintain {
        #[command(subcommand)]
        action: MaintainCmd,
    },
}

#[derive(Subcommand)]
enum MaintainCmd {
    /// Drop guesses older than the eviction window
    Evict,
    /// Export the stats document
    Export {
        /// Document shape
        #[arg(long, value_enum, default_value_t = ShapeArg::Pairs)]
        shape: ShapeArg,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace stats with an exported document
    Import {
        /// Document to import
        file: PathBuf,
    },
    /// Clear all stats
    Reset,
    /// List accounts stored on this device
    Accounts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Expertise,
    Accuracy,
}

impl From<SortArg> for WordSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Expertise => WordSort::Expertise,
            SortArg::Accuracy => WordSort::Accuracy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ShapeArg {
    Pairs,
    Flat,
}

impl From<ShapeArg> for DocumentShape {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Pairs => DocumentShape::Pairs,
            ShapeArg::Flat => DocumentShape::Flat,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    init_tracing();
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("kalike error: {}", e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}

/// Install the stderr log subscriber, filtered by `KALIKE_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("KALIKE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("kalike=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.kalike/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("kalike panic: {}", info);

        if let Some(home) = kalike_home() {
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(crash_log_path(&home))
            {
                let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Everything a command needs, resolved from flags, env and config.
struct Context {
    config: Config,
    vocabulary: Option<Vocabulary>,
    vocabulary_size: usize,
    principal: Principal,
}

impl Context {
    fn resolve(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load();

        // An explicit --vocabulary must load; a configured one may fail open
        let vocabulary = match (&cli.vocabulary, &config.vocabulary.path) {
            (Some(path), _) => Some(Vocabulary::load(path)?),
            (None, Some(path)) => Vocabulary::load(path)
                .map(Some)
                .fail_open_default("loading configured vocabulary"),
            (None, None) => None,
        };

        let vocabulary_size =
            resolve_vocabulary_size(cli.vocabulary_size, vocabulary.as_ref(), &config);

        let principal = match &cli.account {
            Some(id) => Principal::account(id.as_str()),
            None => Principal::Guest,
        };

        Ok(Self {
            config,
            vocabulary,
            vocabulary_size,
            principal,
        })
    }

    fn open_session(&self) -> Result<LearnerSession<FileStatsStore>, Box<dyn std::error::Error>> {
        let store = FileStatsStore::new()?;
        Ok(LearnerSession::open(
            store,
            self.principal.clone(),
            &self.config,
            Utc::now(),
        )?)
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let context = Context::resolve(&cli)?;
    let (json, quiet) = (cli.json, cli.quiet);

    match cli.command {
        // --correct and --wrong are mutually exclusive and one is required
        Commands::Record { word, correct, .. } => {
            run_record(context, RecordInput::Guess { word, correct }, json, quiet)
        }
        Commands::Reveal { word } => run_record(context, RecordInput::Reveal { word }, json, quiet),
        Commands::Check { word, answer } => {
            run_record(context, RecordInput::Check { word, answer }, json, quiet)
        }
        Commands::Game => run_record(context, RecordInput::Game, json, quiet),
        Commands::Level => run_stats(context, json, quiet, false, true),
        Commands::Stats { detailed } => run_stats(context, json, quiet, detailed, false),
        Commands::Words {
            sort,
            practice,
            limit,
        } => run_words(context, json, quiet, sort.into(), practice, limit),
        Commands::Maintain { action } => {
            let action = match action {
                MaintainCmd::Evict => MaintainAction::Evict,
                MaintainCmd::Export { shape, output } => MaintainAction::Export {
                    shape: shape.into(),
                    output,
                },
                MaintainCmd::Import { file } => MaintainAction::Import { path: file },
                MaintainCmd::Reset => MaintainAction::Reset,
                MaintainCmd::Accounts => MaintainAction::Accounts,
            };
            run_maintain(context, action, json, quiet)
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::FAILURE as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}

fn run_record(
    context: Context,
    input: RecordInput,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = context.open_session()?;
    let mut cmd = RecordCommand::new(session, context.vocabulary, context.vocabulary_size);
    let options = RecordOptions { json, quiet };

    let output = cmd.run(&input);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_stats(
    context: Context,
    json: bool,
    quiet: bool,
    detailed: bool,
    level_only: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = context.open_session()?;
    let cmd = StatsCommand::new(&session, context.vocabulary_size);
    let options = StatsOptions {
        json,
        quiet,
        detailed,
        level_only,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_words(
    context: Context,
    json: bool,
    quiet: bool,
    sort: WordSort,
    practice: bool,
    limit: Option<usize>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = context.open_session()?;
    let cmd = WordsCommand::new(&session, context.vocabulary.as_ref());
    let options = WordsOptions {
        json,
        quiet,
        sort,
        practice,
        limit,
        ..Default::default()
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_maintain(
    context: Context,
    action: MaintainAction,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = context.open_session()?;
    let mut cmd = MaintainCommand::new(session);
    let options = MaintainOptions { json, quiet };

    let output = cmd.run(&action);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
