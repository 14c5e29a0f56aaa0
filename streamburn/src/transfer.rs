//! Chunked payload transfer engine.
//!
//! Splits a payload into fixed-size chunks and drains them through a
//! [`ByteSink`] in strict payload order, blocking on each write and pausing
//! briefly between chunks so a slow receiver's input buffer is not overrun.
//!
//! There is no framing, acknowledgment, checksum, or retry: a successful
//! transfer means every byte was accepted by the local write buffer, nothing
//! more. The first write failure aborts the whole transfer.

use log::{debug, trace};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::sink::ByteSink;

/// Default chunk size in bytes (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Default pause between consecutive chunks.
pub const DEFAULT_INTER_CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Transfer configuration options.
///
/// No adaptive flow control is attempted; the fixed inter-chunk pause is
/// the only concession to slow receivers.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Chunk size in bytes. Must be non-zero.
    pub chunk_size: usize,
    /// Pause between consecutive chunk writes.
    pub inter_chunk_delay: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_chunk_delay: DEFAULT_INTER_CHUNK_DELAY,
        }
    }
}

impl TransferConfig {
    /// Configuration with a custom chunk size and the default delay.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Configuration with a custom inter-chunk delay.
    #[must_use]
    pub fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// Total bytes accepted by the sink.
    pub bytes_sent: usize,
    /// Number of chunks written.
    pub chunks_written: usize,
}

/// Chunked transfer handler.
///
/// Borrows the sink exclusively for the duration of the transfer, which is
/// what guarantees a single writer and strict chunk ordering.
pub struct ChunkTransfer<'a, S: ByteSink> {
    sink: &'a mut S,
    config: TransferConfig,
}

impl<'a, S: ByteSink> ChunkTransfer<'a, S> {
    /// Create a transfer handler with default configuration.
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            config: TransferConfig::default(),
        }
    }

    /// Create a transfer handler with custom configuration.
    pub fn with_config(sink: &'a mut S, config: TransferConfig) -> Self {
        Self { sink, config }
    }

    /// Stream the payload through the sink.
    ///
    /// `progress` receives a percentage in 0–100 after every successful
    /// chunk; values are monotonically non-decreasing and the final emission
    /// is exactly 100. An empty payload writes nothing and emits a single
    /// 100.
    ///
    /// On a write failure the transfer aborts immediately and the error
    /// carries `bytes_sent` at the last completed chunk boundary; remaining
    /// chunks are never attempted.
    pub fn send<F>(&mut self, payload: &Payload, mut progress: F) -> Result<TransferReport>
    where
        F: FnMut(u8),
    {
        if self.config.chunk_size == 0 {
            return Err(Error::Config("chunk size must be non-zero".into()));
        }

        let data = payload.as_bytes();
        let total = data.len();
        debug!(
            "Starting transfer to {}: {} bytes in {}-byte chunks",
            self.sink.name(),
            total,
            self.config.chunk_size
        );

        if total == 0 {
            progress(100);
            return Ok(TransferReport {
                bytes_sent: 0,
                chunks_written: 0,
            });
        }

        let mut bytes_sent = 0usize;
        let mut chunks_written = 0usize;

        for chunk in data.chunks(self.config.chunk_size) {
            if chunks_written > 0 && !self.config.inter_chunk_delay.is_zero() {
                thread::sleep(self.config.inter_chunk_delay);
            }

            self.write_chunk(chunk, bytes_sent)?;
            bytes_sent += chunk.len();
            chunks_written += 1;

            // 100 is reserved for the completion emission; a nearly-done
            // chunk that rounds up is clamped to 99.
            let pct = if bytes_sent == total {
                100
            } else {
                percent(bytes_sent, total).min(99)
            };
            trace!("Chunk {chunks_written} done, {bytes_sent}/{total} bytes ({pct}%)");
            progress(pct);
        }

        debug!("Transfer complete: {bytes_sent} bytes in {chunks_written} chunks");
        Ok(TransferReport {
            bytes_sent,
            chunks_written,
        })
    }

    fn write_chunk(&mut self, chunk: &[u8], bytes_sent: usize) -> Result<()> {
        self.sink
            .write_all(chunk)
            .and_then(|()| self.sink.flush())
            .map_err(|source| Error::WriteFailed { bytes_sent, source })
    }
}

/// Percentage of `sent` over `total`, rounded to the nearest integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn percent(sent: usize, total: usize) -> u8 {
    (sent as f64 / total as f64 * 100.0).round() as u8
}
