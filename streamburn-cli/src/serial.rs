//! Interactive serial port selection.
//!
//! Resolution order: explicit CLI port, then the configured port, then
//! enumeration. With several candidates the user picks one via dialoguer;
//! non-interactive mode never prompts and fails instead.

use {
    crate::{CliError, config::Config},
    anyhow::Result,
    console::style,
    dialoguer::{Confirm, Error as DialoguerError, Select, theme::ColorfulTheme},
    log::{debug, error, info},
    std::{cmp::Ordering, io::IsTerminal},
    streamburn::{PortInfo, list_ports},
};

/// Options for serial port selection.
#[derive(Debug, Clone, Default)]
pub struct SerialOptions {
    /// Explicit port specified via CLI.
    pub port: Option<String>,
    /// Non-interactive mode (fail if multiple ports).
    pub non_interactive: bool,
}

fn usage_err(message: &str) -> anyhow::Error {
    // Selection failures are setup problems, not runtime problems; keep them
    // in the Usage class so they map to exit code 2.
    CliError::Usage(message.to_string()).into()
}

fn select_non_interactive_port(candidates: Vec<PortInfo>) -> Result<PortInfo> {
    // Non-interactive mode must be deterministic and never prompt.
    match candidates.len().cmp(&1) {
        Ordering::Equal => {
            let port = candidates
                .into_iter()
                .next()
                .expect("candidates has exactly 1 element here");
            Ok(port)
        },
        Ordering::Greater => Err(usage_err(
            "Multiple serial ports found; specify one with --port",
        )),
        Ordering::Less => Err(usage_err("No serial ports available")),
    }
}

/// Select a serial port interactively or automatically.
pub fn select_serial_port(options: &SerialOptions, config: &Config) -> Result<PortInfo> {
    // If port explicitly specified, use it
    if let Some(port_name) = &options.port {
        return Ok(find_port_by_name(port_name)?);
    }

    // If port in config, use it
    if let Some(port_name) = &config.connection.serial {
        debug!("Using port from config: {port_name}");
        return Ok(find_port_by_name(port_name)?);
    }

    // Detect available ports
    let ports = list_ports()?;

    if options.non_interactive {
        return select_non_interactive_port(ports);
    }

    match ports.len().cmp(&1) {
        Ordering::Greater => {
            ensure_interactive_terminal()?;
            select_port_interactive(ports)
        },
        Ordering::Equal => {
            let port = ports
                .into_iter()
                .next()
                .expect("ports has exactly 1 element here");
            info!("Auto-selected port: {}", port.name);
            Ok(port)
        },
        Ordering::Less => Err(usage_err("No serial ports found")),
    }
}

fn ensure_interactive_terminal() -> Result<()> {
    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        Ok(())
    } else {
        Err(CliError::Usage(
            "Interactive port selection requires a terminal; use --port or --non-interactive"
                .to_string(),
        )
        .into())
    }
}

fn map_prompt_error(err: DialoguerError) -> anyhow::Error {
    match err {
        DialoguerError::IO(io_err) => {
            if io_err.kind() == std::io::ErrorKind::Interrupted {
                CliError::Cancelled("Port selection cancelled".to_string()).into()
            } else {
                CliError::Usage("Port selection prompt failed".to_string()).into()
            }
        },
    }
}

/// Find a port by name.
///
/// The explicit name wins even when enumeration does not list it; a user may
/// name a port the platform cannot describe (e.g. a pseudo-terminal).
fn find_port_by_name(name: &str) -> Result<PortInfo> {
    let ports = list_ports().unwrap_or_default();

    // Try exact match first
    if let Some(port) = ports.iter().find(|p| p.name == name) {
        return Ok(port.clone());
    }

    // Try case-insensitive match (Windows)
    if let Some(port) = ports.iter().find(|p| p.name.eq_ignore_ascii_case(name)) {
        return Ok(port.clone());
    }

    Ok(PortInfo {
        name: name.to_string(),
        vid: None,
        pid: None,
        manufacturer: None,
        product: None,
        serial_number: None,
    })
}

/// Human-readable one-line label for a port.
fn port_label(port: &PortInfo) -> String {
    let device_info = if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
        format!(" ({vid:04X}:{pid:04X})")
    } else {
        String::new()
    };

    let product = port
        .product
        .as_ref()
        .map(|p| format!(" - {}", style(p).dim()))
        .unwrap_or_default();

    format!("{}{device_info}{product}", port.name)
}

/// Interactive port selection.
fn select_port_interactive(ports: Vec<PortInfo>) -> Result<PortInfo> {
    eprintln!(
        "{} Detected {} serial ports",
        style("ℹ").blue(),
        ports.len()
    );

    let labels: Vec<String> = ports.iter().map(port_label).collect();

    // Truncate labels to fit terminal width to prevent wrapping in narrow
    // terminals.
    let term_width = console::Term::stderr().size().1 as usize;
    let max_item_width = term_width.saturating_sub(4);
    let labels: Vec<String> = labels
        .into_iter()
        .map(|n| console::truncate_str(&n, max_item_width, "\u{2026}").into_owned())
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a serial port")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(map_prompt_error)?;

    match selection {
        Some(index) => ports
            .into_iter()
            .nth(index)
            .ok_or_else(|| anyhow::anyhow!("Invalid port index: {index}")),
        None => Err(CliError::Cancelled("Port selection cancelled".to_string()).into()),
    }
}

/// Ask the user whether to remember this port for future runs.
pub fn ask_remember_port(port: &PortInfo, config: &mut Config) -> Result<()> {
    if config.connection.serial.as_deref() == Some(port.name.as_str()) {
        return Ok(()); // Already saved
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Remember {} for future runs?", port.name))
        .default(false)
        .interact_opt()
        .map_err(map_prompt_error)?
        .unwrap_or(false);

    if confirmed {
        if let Err(e) = config.remember_port(&port.name) {
            error!("Failed to save port configuration: {e}");
        }
    }

    Ok(())
}
