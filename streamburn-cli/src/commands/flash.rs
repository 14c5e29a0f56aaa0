//! Flash command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io::IsTerminal;
use std::time::Duration;
use streamburn::{
    ConnectionState, NativeCapability, Payload, PayloadSource, SerialConnection, TransferConfig,
};

use crate::config::Config;
use crate::serial::{SerialOptions, ask_remember_port, select_serial_port};
use crate::{Cli, use_fancy_output};

/// Flash command implementation.
pub(crate) fn cmd_flash(cli: &Cli, config: &mut Config, image: &str) -> Result<()> {
    let source: PayloadSource = image.parse()?;

    if !cli.quiet {
        eprintln!("{} Loading firmware: {image}", style("📦").cyan());
    }
    let payload = load_payload(&source)?;
    if !cli.quiet {
        eprintln!(
            "{} Loaded {} bytes",
            style("✓").green(),
            payload.len()
        );
    }

    // Select port
    let options = SerialOptions {
        port: cli.port.clone(),
        non_interactive: cli.non_interactive,
    };
    let port = select_serial_port(&options, config)?;

    let baud = cli.effective_baud(config);
    if !cli.quiet {
        eprintln!(
            "{} Using port {} at {} baud",
            style("🔌").cyan(),
            style(&port.name).cyan(),
            baud
        );
    }

    // Open the connection
    let mut conn = SerialConnection::new(NativeCapability::with_port(&port.name)).with_baud(baud);

    let quiet = cli.quiet;
    conn.on_state_change(move |state| {
        if quiet {
            return;
        }
        match state {
            ConnectionState::Open => eprintln!("{} Connected", style("✓").green()),
            ConnectionState::Closed => debug!("Connection closed"),
        }
    });

    conn.open()?;

    // Progress bar
    let pb = if cli.quiet || !use_fancy_output() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(100);
        #[allow(clippy::unwrap_used)] // Static template string
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.set_message("Flashing");
        pb
    };

    let transfer_config = TransferConfig::default()
        .with_chunk_size(cli.effective_chunk_size(config))
        .with_inter_chunk_delay(Duration::from_millis(cli.effective_delay_ms(config)));

    let result = conn.transfer(&payload, &transfer_config, |pct| {
        pb.set_position(u64::from(pct));
    });

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            pb.abandon_with_message("Failed");
            // Release the port before reporting; the error keeps the offset.
            let _ = conn.close();
            if let Some(bytes_sent) = err.bytes_sent() {
                eprintln!(
                    "{} Transfer aborted after {bytes_sent} bytes",
                    style("✗").red()
                );
            }
            return Err(err.into());
        },
    };

    pb.finish_with_message("Complete");
    conn.close()?;

    if !cli.quiet {
        eprintln!(
            "\n{} Flashed {} bytes in {} chunks",
            style("🎉").green().bold(),
            report.bytes_sent,
            report.chunks_written
        );
    }

    // Offer to remember an interactively selected port
    if !cli.non_interactive
        && cli.port.is_none()
        && config.connection.serial.is_none()
        && std::io::stdin().is_terminal()
        && std::io::stderr().is_terminal()
    {
        ask_remember_port(&port, config)?;
    }

    Ok(())
}

/// Load the payload from a local file or fetch it over HTTP.
fn load_payload(source: &PayloadSource) -> Result<Payload> {
    match source {
        PayloadSource::File(path) => Payload::from_file(path)
            .with_context(|| format!("Failed to load firmware from {}", path.display())),
        PayloadSource::Url(url) => {
            debug!("Fetching firmware from {url}");
            let response = reqwest::blocking::get(url)
                .and_then(reqwest::blocking::Response::error_for_status)
                .with_context(|| format!("Failed to fetch firmware from {url}"))?;
            let bytes = response
                .bytes()
                .with_context(|| format!("Failed to read firmware body from {url}"))?;
            Ok(Payload::from_bytes(bytes.to_vec()))
        },
    }
}
