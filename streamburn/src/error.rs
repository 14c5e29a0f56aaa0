//! Error types for streamburn.

use std::io;
use thiserror::Error;

/// Result type for streamburn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for streamburn operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The environment has no usable serial capability.
    #[error("Serial capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Port selection was cancelled by the user or selector.
    #[error("Port selection cancelled")]
    SelectionCancelled,

    /// No serial port matched the requested choice.
    #[error("No serial port found")]
    PortNotFound,

    /// The port refused to open at the requested configuration.
    #[error("Failed to open port {port}")]
    PortOpenFailed {
        /// Name of the port that refused to open.
        port: String,
        /// Underlying serial error.
        #[source]
        source: serialport::Error,
    },

    /// A chunk write was rejected or dropped by the transport.
    ///
    /// `bytes_sent` is the last successfully completed chunk boundary;
    /// chunks after the failure are never attempted.
    #[error("Write failed after {bytes_sent} bytes")]
    WriteFailed {
        /// Bytes accepted before the failing write.
        bytes_sent: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The payload source is neither a byte buffer, a file, nor a
    /// supported URL.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Open was requested while the connection already holds a writer.
    #[error("Connection already open on {0}")]
    AlreadyOpen(String),

    /// An operation requiring an open connection found it closed.
    #[error("Connection is not open")]
    NotOpen,

    /// I/O error (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Byte offset at which a transfer failed, if this is a write failure.
    pub fn bytes_sent(&self) -> Option<usize> {
        match self {
            Self::WriteFailed { bytes_sent, .. } => Some(*bytes_sent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_exposes_offset() {
        let err = Error::WriteFailed {
            bytes_sent: 16384,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "device gone"),
        };
        assert_eq!(err.bytes_sent(), Some(16384));
        assert!(err.to_string().contains("16384"));
    }

    #[test]
    fn test_other_errors_have_no_offset() {
        assert_eq!(Error::NotOpen.bytes_sent(), None);
        assert_eq!(Error::SelectionCancelled.bytes_sent(), None);
    }
}
