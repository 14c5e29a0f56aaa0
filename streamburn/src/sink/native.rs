//! Native serial sink implementation using the `serialport` crate.

use {
    crate::{
        error::{Error, Result},
        sink::{ByteSink, PortInfo, SerialCapability},
    },
    log::{debug, trace},
    serialport::{DataBits, FlowControl, Parity, StopBits},
    std::{io::Write, time::Duration},
};

/// Write timeout applied to opened ports.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// How the native capability picks a port when asked.
pub enum PortChoice {
    /// Use this exact port name.
    Named(String),
    /// Use the first enumerated port.
    FirstAvailable,
    /// Ask a caller-supplied selector to pick among the enumerated ports.
    ///
    /// The selector returns the chosen port name, or
    /// [`Error::SelectionCancelled`] to decline.
    Selector(Box<dyn FnMut(&[PortInfo]) -> Result<String> + Send>),
}

impl std::fmt::Debug for PortChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::FirstAvailable => f.write_str("FirstAvailable"),
            Self::Selector(_) => f.write_str("Selector(..)"),
        }
    }
}

/// Native serial capability for desktop platforms.
pub struct NativeCapability {
    choice: PortChoice,
}

impl NativeCapability {
    /// Capability that auto-selects the first available port.
    pub fn new() -> Self {
        Self {
            choice: PortChoice::FirstAvailable,
        }
    }

    /// Capability bound to an explicit port name.
    pub fn with_port(name: impl Into<String>) -> Self {
        Self {
            choice: PortChoice::Named(name.into()),
        }
    }

    /// Capability that defers port selection to a callback.
    pub fn with_selector<F>(selector: F) -> Self
    where
        F: FnMut(&[PortInfo]) -> Result<String> + Send + 'static,
    {
        Self {
            choice: PortChoice::Selector(Box::new(selector)),
        }
    }
}

impl Default for NativeCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialCapability for NativeCapability {
    type Sink = NativeSink;

    fn probe(&self) -> Result<()> {
        // Enumeration failing outright means the platform has no usable
        // serial stack, which is distinct from "zero ports plugged in".
        serialport::available_ports()
            .map(|_| ())
            .map_err(|e| Error::CapabilityUnavailable(e.to_string()))
    }

    fn request_port(&mut self) -> Result<String> {
        match &mut self.choice {
            PortChoice::Named(name) => Ok(name.clone()),
            PortChoice::FirstAvailable => {
                let ports = list_ports()?;
                ports
                    .into_iter()
                    .next()
                    .map(|p| p.name)
                    .ok_or(Error::PortNotFound)
            },
            PortChoice::Selector(selector) => {
                let ports = list_ports()?;
                selector(&ports)
            },
        }
    }

    fn open_port(&mut self, name: &str, baud: u32) -> Result<Self::Sink> {
        NativeSink::open(name, baud)
    }
}

/// Exclusive writer over a native serial port.
pub struct NativeSink {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
}

impl NativeSink {
    /// Open a serial port at 8N1 with no flow control.
    pub fn open(name: &str, baud: u32) -> Result<Self> {
        debug!("Opening {name} at {baud} baud");

        let port = serialport::new(name, baud)
            .timeout(WRITE_TIMEOUT)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|source| Error::PortOpenFailed {
                port: name.to_string(),
                source,
            })?;

        Ok(Self {
            port: Some(port),
            name: name.to_string(),
        })
    }
}

impl ByteSink for NativeSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> Result<()> {
        trace!("Closing {}", self.name);
        // Take ownership of the port and let it drop (close)
        self.port.take();
        Ok(())
    }
}

impl Write for NativeSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "port closed"))
            .and_then(|p| p.write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "port closed"))
            .and_then(|p| p.flush())
    }
}

/// List all available serial ports with USB metadata where known.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(Error::Serial)?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let (vid, pid, manufacturer, product, serial_number) = match &p.port_type {
                serialport::SerialPortType::UsbPort(info) => (
                    Some(info.vid),
                    Some(info.pid),
                    info.manufacturer.clone(),
                    info.product.clone(),
                    info.serial_number.clone(),
                ),
                _ => (None, None, None, None, None),
            };

            PortInfo {
                name: p.port_name,
                vid,
                pid,
                manufacturer,
                product,
                serial_number,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports_does_not_panic() {
        let _ = list_ports();
    }

    #[test]
    fn test_named_choice_returns_name_without_enumeration() {
        let mut cap = NativeCapability::with_port("/dev/ttyUSB7");
        assert_eq!(cap.request_port().unwrap(), "/dev/ttyUSB7");
    }

    #[test]
    fn test_selector_cancellation_propagates() {
        let mut cap = NativeCapability::with_selector(|_ports| Err(Error::SelectionCancelled));
        // Selector runs regardless of how many ports the host has.
        assert!(matches!(
            cap.request_port(),
            Err(Error::SelectionCancelled) | Err(Error::Serial(_))
        ));
    }

    #[test]
    fn test_port_choice_debug_hides_selector() {
        let choice = PortChoice::Selector(Box::new(|_| Err(Error::SelectionCancelled)));
        assert_eq!(format!("{choice:?}"), "Selector(..)");
        let named = PortChoice::Named("COM3".into());
        assert!(format!("{named:?}").contains("COM3"));
    }
}
