//! Serial connection lifecycle management.
//!
//! A [`Connection`] owns the lifecycle of a single serial link:
//!
//! ```text
//! Closed --open()--> Open
//! Open  --close()--> Closed
//! ```
//!
//! There are no other states and no automatic reconnection. The writable
//! sink exists if and only if the connection is `Open`. A write failure
//! while `Open` leaves the connection in an indeterminate state that the
//! caller must resolve with an explicit [`close`](Connection::close).
//!
//! State changes are published synchronously to a registered listener so
//! callers can recompute readiness on change instead of polling.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::sink::{ByteSink, DEFAULT_BAUD, NativeCapability, SerialCapability};
use crate::transfer::{ChunkTransfer, TransferConfig, TransferReport};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No port held; writes are impossible.
    Closed,
    /// A port is open and its exclusive writer is held.
    Open,
}

/// Callback invoked on every actual state transition.
pub type StateListener = Box<dyn FnMut(ConnectionState) + Send>;

/// A serial connection backed by the native `serialport` capability.
pub type SerialConnection = Connection<NativeCapability>;

/// Owns one serial connection from open to close.
///
/// Generic over the capability type `C`, which decides how ports are
/// discovered and opened. Tests substitute in-memory capabilities.
pub struct Connection<C: SerialCapability> {
    capability: C,
    baud: u32,
    sink: Option<C::Sink>,
    listener: Option<StateListener>,
}

impl<C: SerialCapability> Connection<C> {
    /// Create a closed connection at the default baud rate (115200).
    pub fn new(capability: C) -> Self {
        Self {
            capability,
            baud: DEFAULT_BAUD,
            sink: None,
            listener: None,
        }
    }

    /// Set the baud rate used when opening.
    #[must_use]
    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Register a listener for state transitions.
    ///
    /// The listener fires synchronously, once per actual Closed/Open
    /// transition. Replaces any previously registered listener.
    pub fn on_state_change<F>(&mut self, listener: F)
    where
        F: FnMut(ConnectionState) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if self.sink.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    /// Whether the connection holds an open port.
    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    /// Name of the currently open port, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.sink.as_ref().map(ByteSink::name)
    }

    /// Configured baud rate.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Open the connection: probe the capability, resolve a port, and
    /// acquire its exclusive writer.
    ///
    /// Capability support is checked before any port selection occurs.
    /// Opening while already open fails with [`Error::AlreadyOpen`]; a
    /// second writer is never acquired.
    pub fn open(&mut self) -> Result<()> {
        if let Some(sink) = &self.sink {
            return Err(Error::AlreadyOpen(sink.name().to_string()));
        }

        self.capability.probe()?;
        let name = self.capability.request_port()?;
        let sink = self.capability.open_port(&name, self.baud)?;

        info!("Connection open on {} at {} baud", sink.name(), self.baud);
        self.sink = Some(sink);
        self.notify(ConnectionState::Open);
        Ok(())
    }

    /// Close the connection and release the port.
    ///
    /// Closing an already-closed connection is a success no-op; callers may
    /// double-close freely.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut sink) = self.sink.take() else {
            debug!("Close requested on a closed connection (no-op)");
            return Ok(());
        };

        let result = sink.close();
        info!("Connection closed on {}", sink.name());
        self.notify(ConnectionState::Closed);
        result
    }

    /// Mutable access to the writable sink.
    ///
    /// Fails with [`Error::NotOpen`] when closed. The `&mut` borrow is what
    /// keeps transfers exclusive; a second writer cannot exist.
    pub fn sink_mut(&mut self) -> Result<&mut C::Sink> {
        self.sink.as_mut().ok_or(Error::NotOpen)
    }

    /// Stream a payload through the open connection in fixed-size chunks.
    ///
    /// Convenience wrapper over [`ChunkTransfer`]; see that type for the
    /// chunking, progress, and failure contract.
    pub fn transfer<F>(
        &mut self,
        payload: &Payload,
        config: &TransferConfig,
        progress: F,
    ) -> Result<TransferReport>
    where
        F: FnMut(u8),
    {
        let sink = self.sink.as_mut().ok_or(Error::NotOpen)?;
        ChunkTransfer::with_config(sink, config.clone()).send(payload, progress)
    }

    fn notify(&mut self, state: ConnectionState) {
        if let Some(listener) = &mut self.listener {
            listener(state);
        }
    }
}
