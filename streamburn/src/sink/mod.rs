//! Byte-sink capability abstraction.
//!
//! The transfer core never talks to a concrete transport. It depends on two
//! small traits:
//!
//! - [`ByteSink`]: an exclusively owned writable handle
//! - [`SerialCapability`]: the host environment's ability to hand one out
//!
//! ```text
//! +------------------+
//! |  Transfer Engine |
//! +--------+---------+
//!          |
//!          v
//! +--------+---------+
//! |  ByteSink trait  |
//! +--------+---------+
//!          |
//!          v
//! +--------+---------+
//! | Native serial    |
//! |  (serialport)    |
//! +------------------+
//! ```
//!
//! Separating the capability from the sink keeps port selection and opening
//! out of the chunk loop, and lets tests substitute in-memory sinks.

pub mod native;

use std::io::Write;

use crate::error::Result;

/// Default baud rate for serial connections.
pub const DEFAULT_BAUD: u32 = 115200;

/// An exclusive writable handle to an open byte stream.
///
/// The stream carries no framing, header, or trailer; whatever is written is
/// passed through verbatim.
pub trait ByteSink: Write + Send {
    /// Name of the underlying port (e.g. "/dev/ttyUSB0", "COM3").
    fn name(&self) -> &str;

    /// Close the sink and release the underlying port.
    ///
    /// After closing, writes fail with a `NotConnected` I/O error.
    fn close(&mut self) -> Result<()>;
}

/// Host-environment capability for acquiring serial byte sinks.
pub trait SerialCapability {
    /// Concrete sink type handed out by [`open_port`](Self::open_port).
    type Sink: ByteSink;

    /// Check that the environment supports serial at all.
    ///
    /// Fails with [`Error::CapabilityUnavailable`](crate::Error) before any
    /// port selection takes place.
    fn probe(&self) -> Result<()>;

    /// Resolve which port to use.
    ///
    /// May prompt the user through a selector; fails with
    /// [`Error::SelectionCancelled`](crate::Error) when declined.
    fn request_port(&mut self) -> Result<String>;

    /// Open the named port at the given baud rate and acquire its writer.
    fn open_port(&mut self, name: &str, baud: u32) -> Result<Self::Sink>;
}

/// Serial port information.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortInfo {
    /// Port name/path.
    pub name: String,
    /// USB vendor ID (if available).
    pub vid: Option<u16>,
    /// USB product ID (if available).
    pub pid: Option<u16>,
    /// Manufacturer string (if available).
    pub manufacturer: Option<String>,
    /// Product string (if available).
    pub product: Option<String>,
    /// Serial number (if available).
    pub serial_number: Option<String>,
}

pub use native::{NativeCapability, NativeSink, PortChoice, list_ports};
