//! Port listing command implementation.

use anyhow::Result;
use console::style;
use streamburn::list_ports;

/// List ports command implementation.
///
/// With `--json` the port list goes to stdout as a machine-readable
/// document; the human-readable listing goes to stderr so stdout stays
/// clean for pipelines either way.
pub(crate) fn cmd_list_ports(json: bool) -> Result<()> {
    let detected = list_ports()?;

    if json {
        let ports: Vec<serde_json::Value> = detected
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "vid": p.vid,
                    "pid": p.pid,
                    "manufacturer": p.manufacturer,
                    "product": p.product,
                    "serial_number": p.serial_number,
                })
            })
            .collect();
        let output = serde_json::json!({
            "ok": true,
            "data": {
                "ports": ports,
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    eprintln!("{}", style("Available serial ports:").bold().underlined());

    if detected.is_empty() {
        eprintln!("  {}", style("No serial ports found").dim());
    } else {
        for port in &detected {
            let vid_pid = if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
                format!(" ({vid:04X}:{pid:04X})")
            } else {
                String::new()
            };

            let product = port
                .product
                .as_deref()
                .map(|p| format!(" - {}", style(p).dim()))
                .unwrap_or_default();

            eprintln!(
                "  {} {}{}{}",
                style("•").green(),
                style(&port.name).cyan(),
                vid_pid,
                product
            );
        }
    }

    Ok(())
}
