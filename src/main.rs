//! YAPL Programming Language - CLI

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use yapl::backends::dev::repl::EditorSource;
use yapl::frontend::core::lexer::{CharSource, ReaderSource, TokenQueue, Tokenizer};
use yapl::util::config::{load_config_file, load_user_config, OptLevel, YaplConfig};
use yapl::util::logger::{self, LogLevel};
use yapl::{run_tokens, NAME, VERSION};

/// A tiny C-like language with an incremental read-eval-print compiler
#[derive(Parser, Debug)]
#[command(name = "yapl")]
#[command(author = "YAPL Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    /// Source file to run; reads standard input when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file to use instead of the user-level one
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log the IR of every committed unit
    #[arg(long)]
    emit_ir: bool,

    /// Optimization level (0, 1, 2)
    #[arg(short = 'O', value_name = "LEVEL")]
    opt_level: Option<OptLevel>,

    /// Tokenize on the main thread instead of a worker
    #[arg(long)]
    sync_lexer: bool,
}

fn load_config(args: &Args) -> Result<YaplConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => load_user_config().unwrap_or_else(|e| {
            eprintln!("warning: ignoring user config: {}", e);
            YaplConfig::default()
        }),
    };

    if args.emit_ir {
        config.jit.print_ir = true;
    }
    if let Some(level) = args.opt_level {
        config.jit.opt_level = level;
    }
    if args.sync_lexer {
        config.lexer.threaded = false;
    }
    if args.verbose {
        config.log.level = LogLevel::Debug;
    }
    Ok(config)
}

/// Run `source` through the threaded queue or the synchronous tokenizer
fn run_source<S>(
    source: S,
    config: &YaplConfig,
) -> Result<()>
where
    S: CharSource + Send + 'static,
{
    let out = io::stdout().lock();
    let stats = if config.lexer.threaded {
        let queue = TokenQueue::spawn(source, config.lexer.queue_capacity)
            .context("Failed to start tokenizer thread")?;
        run_tokens(queue, config, out)?
    } else {
        run_tokens(Tokenizer::new(source), config, out)?
    };
    tracing::debug!("session: {:?}", stats);
    Ok(())
}

fn run_file(
    path: &Path,
    config: &YaplConfig,
) -> Result<()> {
    let source = ReaderSource::open(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    run_source(source, config)
}

fn run_interactive(config: &YaplConfig) -> Result<()> {
    let source = EditorSource::new(&config.repl).context("Failed to start line editor")?;
    let stats = run_tokens(Tokenizer::new(source), config, io::stdout().lock())?;
    tracing::debug!("session: {:?}", stats);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    logger::init_from_config(&config.log);

    eprintln!("{} v{}", NAME, VERSION);
    if args.verbose {
        eprintln!("Host: {}", std::env::consts::OS);
    }

    match &args.file {
        Some(file) => {
            run_file(file, &config).with_context(|| format!("Failed to run: {}", file.display()))?
        }
        None if io::stdin().is_terminal() => run_interactive(&config)?,
        None => run_source(ReaderSource::stdin(), &config)?,
    }

    Ok(())
}
