//! In-memory sink and capability doubles shared by unit tests.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::sink::{ByteSink, SerialCapability};

/// Records every write as a separate chunk; can be armed to fail.
pub(crate) struct MockSink {
    name: String,
    /// Chunks recorded so far, shared with the test body.
    pub(crate) writes: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_at: Option<usize>,
    calls: usize,
    closed: bool,
}

impl MockSink {
    pub(crate) fn new() -> Self {
        Self {
            name: "mock0".to_string(),
            writes: Arc::default(),
            fail_at: None,
            calls: 0,
            closed: false,
        }
    }

    /// Fail the n-th write call (0-based) with a broken pipe.
    pub(crate) fn fail_at_write(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port closed"));
        }
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device dropped chunk"));
        }
        self.writes.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port closed"));
        }
        Ok(())
    }
}

impl ByteSink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Configurable capability double with call counters.
pub(crate) struct MockCapability {
    available: bool,
    cancel: bool,
    refuse_open: bool,
    fail_write_at: Option<usize>,
    /// Times `request_port` was invoked.
    pub(crate) request_calls: Arc<AtomicUsize>,
    /// Times `open_port` was invoked.
    pub(crate) open_calls: Arc<AtomicUsize>,
    /// Chunks recorded by sinks handed out by this capability.
    pub(crate) writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockCapability {
    pub(crate) fn new() -> Self {
        Self {
            available: true,
            cancel: false,
            refuse_open: false,
            fail_write_at: None,
            request_calls: Arc::default(),
            open_calls: Arc::default(),
            writes: Arc::default(),
        }
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub(crate) fn cancel_selection(mut self) -> Self {
        self.cancel = true;
        self
    }

    pub(crate) fn refuse_open(mut self) -> Self {
        self.refuse_open = true;
        self
    }

    pub(crate) fn fail_write_at(mut self, n: usize) -> Self {
        self.fail_write_at = Some(n);
        self
    }
}

impl SerialCapability for MockCapability {
    type Sink = MockSink;

    fn probe(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(Error::CapabilityUnavailable("no serial stack".into()))
        }
    }

    fn request_port(&mut self) -> Result<String> {
        self.request_calls.fetch_add(1, Ordering::Relaxed);
        if self.cancel {
            Err(Error::SelectionCancelled)
        } else {
            Ok("mock0".to_string())
        }
    }

    fn open_port(&mut self, name: &str, _baud: u32) -> Result<Self::Sink> {
        self.open_calls.fetch_add(1, Ordering::Relaxed);
        if self.refuse_open {
            return Err(Error::PortOpenFailed {
                port: name.to_string(),
                source: serialport::Error::new(serialport::ErrorKind::NoDevice, "mock refused"),
            });
        }
        Ok(MockSink {
            name: name.to_string(),
            writes: self.writes.clone(),
            fail_at: self.fail_write_at,
            calls: 0,
            closed: false,
        })
    }
}
