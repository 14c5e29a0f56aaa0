//! streamburn CLI - stream firmware payloads over serial ports.
//!
//! ## Features
//!
//! - Chunked transfer of local or fetched firmware images
//! - Interactive serial port selection
//! - Shell completion generation
//! - Environment variable support

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use env_logger::Env;
use log::debug;
use std::env;
use std::path::PathBuf;

mod commands;
mod config;
mod serial;

use commands::{cmd_flash, cmd_list_ports};
use config::Config;

/// Whether stderr is a terminal (set once at startup).
static STDERR_IS_TTY: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Check if animations should be used (TTY and colors enabled).
fn use_fancy_output() -> bool {
    STDERR_IS_TTY.load(std::sync::atomic::Ordering::Relaxed) && console::colors_enabled_stderr()
}

/// CLI-level error classes that map to distinct exit codes.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Invalid usage or setup; exits with code 2.
    #[error("{0}")]
    Usage(String),
    /// Operation cancelled by the user; exits with code 130.
    #[error("{0}")]
    Cancelled(String),
}

/// streamburn - stream firmware images over a serial port in fixed-size chunks.
///
/// Environment variables:
///   STREAMBURN_PORT              - Default serial port
///   STREAMBURN_BAUD              - Default baud rate (default: 115200)
///   STREAMBURN_NON_INTERACTIVE   - Non-interactive mode (disable prompts)
#[derive(Parser)]
#[command(name = "streamburn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Serial port to use (auto-detected if not specified).
    #[arg(short, long, global = true, env = "STREAMBURN_PORT")]
    port: Option<String>,

    /// Baud rate for the connection (default: 115200).
    #[arg(short, long, global = true, env = "STREAMBURN_BAUD")]
    baud: Option<u32>,

    /// Chunk size in bytes (default: 16384).
    #[arg(
        long,
        global = true,
        env = "STREAMBURN_CHUNK_SIZE",
        value_parser = clap::value_parser!(u64).range(1..=16_777_216)
    )]
    chunk_size: Option<u64>,

    /// Pause between chunks in milliseconds (default: 10).
    #[arg(long, global = true, env = "STREAMBURN_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Verbose output level (-v, -vv, -vvv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Non-interactive mode (fail instead of prompting).
    #[arg(long, global = true, env = "STREAMBURN_NON_INTERACTIVE")]
    non_interactive: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Stream a firmware image to the device.
    Flash {
        /// Firmware image: a local file path or an http(s) URL.
        image: String,
    },

    /// List available serial ports.
    ListPorts {
        /// Output port list as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type for completions.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // --- NO_COLOR and TTY detection ---
    let stderr_is_tty = console::Term::stderr().is_term();
    STDERR_IS_TTY.store(stderr_is_tty, std::sync::atomic::Ordering::Relaxed);

    if env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "streamburn v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    match &cli.command {
        Commands::Flash { image } => cmd_flash(cli, &mut config, image),
        Commands::ListPorts { json } => cmd_list_ports(*json),
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            Ok(())
        },
    }
}

/// Map an error to the CLI exit-code contract: 2 usage, 130 cancelled,
/// 1 anything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::Usage(_) => 2,
            CliError::Cancelled(_) => 130,
        };
    }
    if let Some(streamburn::Error::SelectionCancelled) = err.downcast_ref::<streamburn::Error>() {
        return 130;
    }
    1
}

impl Cli {
    /// Effective baud rate: CLI flag, then config, then 115200.
    fn effective_baud(&self, config: &Config) -> u32 {
        self.baud
            .or(config.connection.baud)
            .unwrap_or(streamburn::DEFAULT_BAUD)
    }

    /// Effective chunk size: CLI flag, then config, then 16384.
    #[allow(clippy::cast_possible_truncation)] // flag range-capped at 16 MiB
    fn effective_chunk_size(&self, config: &Config) -> usize {
        self.chunk_size
            .map(|v| v as usize)
            .or(config.transfer.chunk_size)
            .unwrap_or(streamburn::DEFAULT_CHUNK_SIZE)
    }

    /// Effective inter-chunk delay in milliseconds: CLI flag, then config,
    /// then 10ms.
    #[allow(clippy::cast_possible_truncation)] // default is 10ms
    fn effective_delay_ms(&self, config: &Config) -> u64 {
        self.delay_ms
            .or(config.transfer.delay_ms)
            .unwrap_or(streamburn::DEFAULT_INTER_CHUNK_DELAY.as_millis() as u64)
    }
}

/// Generate shell completions to stdout.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
