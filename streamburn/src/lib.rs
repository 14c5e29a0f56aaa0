//! # streamburn
//!
//! A library for streaming firmware payloads over serial ports in
//! fixed-size chunks.
//!
//! This crate provides the transfer core shared by the `streamburn` CLI:
//!
//! - Connection lifecycle management (closed/open, exclusive writer)
//! - Chunked payload transfer with per-chunk progress reporting
//! - A byte-sink capability abstraction over the `serialport` crate
//!
//! The byte stream is a raw pass-through: no handshake, framing, checksum,
//! or acknowledgment is exchanged with the receiving device. A completed
//! transfer means all bytes were accepted by the local write buffer.
//!
//! ## Features
//!
//! - `serde`: Serialization support for port metadata
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamburn::{Connection, NativeCapability, Payload, TransferConfig};
//!
//! fn main() -> streamburn::Result<()> {
//!     let payload = Payload::from_file("firmware.bin")?;
//!
//!     let mut conn = Connection::new(NativeCapability::with_port("/dev/ttyUSB0"));
//!     conn.open()?;
//!
//!     conn.transfer(&payload, &TransferConfig::default(), |pct| {
//!         println!("Sent {pct}%");
//!     })?;
//!
//!     conn.close()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod error;
pub mod payload;
pub mod sink;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenience
pub use {
    connection::{Connection, ConnectionState, SerialConnection, StateListener},
    error::{Error, Result},
    payload::{Payload, PayloadSource},
    sink::{
        ByteSink, DEFAULT_BAUD, NativeCapability, NativeSink, PortChoice, PortInfo,
        SerialCapability, list_ports,
    },
    transfer::{
        ChunkTransfer, DEFAULT_CHUNK_SIZE, DEFAULT_INTER_CHUNK_DELAY, TransferConfig,
        TransferReport,
    },
};
