//! Stream pumps: dedicated-thread byte movers between a child process and
//! its caller-visible endpoints.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// An in-memory output sink that can be snapshotted while a pump is still
/// writing to it.
///
/// Cloning shares the underlying buffer. The engine keeps one clone and
/// hands another to the pump, so partial output stays observable on the
/// timeout path even if the pump never finishes.
#[derive(Clone, Debug, Default)]
pub(crate) struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        // A poisoned lock still holds valid bytes.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Moves all bytes from a source to a sink on a dedicated thread.
///
/// The pump owns both endpoints for its lifetime and stops when the source
/// reports end-of-data or either endpoint errors. Dropping the endpoints at
/// thread exit is what closes a child's stdin pipe.
pub(crate) struct StreamPump {
    name: &'static str,
    handle: JoinHandle<()>,
    outcome: Receiver<io::Result<u64>>,
}

impl StreamPump {
    /// Start pumping. Fails only if the OS refuses to create the thread.
    pub fn spawn<R, W>(name: &'static str, mut source: R, mut sink: W) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx, outcome) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(format!("pump-{name}"))
            .spawn(move || {
                let result = io::copy(&mut source, &mut sink).and_then(|bytes| {
                    sink.flush()?;
                    Ok(bytes)
                });
                // The receiver is gone when the pump was detached.
                let _ = tx.send(result);
            })?;
        Ok(Self {
            name,
            handle,
            outcome,
        })
    }

    /// Block until the transfer completes and return the number of bytes
    /// moved. Used on the natural-exit path, where the flush guarantee
    /// matters.
    pub fn join(self) -> io::Result<u64> {
        let result = match self.outcome.recv() {
            Ok(result) => result,
            Err(_) => Err(terminated(self.name)),
        };
        let _ = self.handle.join();
        result
    }

    /// Wait up to `grace` for the transfer to finish. Returns `None` and
    /// detaches the thread if it is still blocked — std threads cannot be
    /// killed, and forced cleanup must not hang on a sink that never
    /// accepts bytes.
    pub fn join_within(self, grace: Duration) -> Option<io::Result<u64>> {
        match self.outcome.recv_timeout(grace) {
            Ok(result) => {
                let _ = self.handle.join();
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!(pump = self.name, "still busy after grace period, detaching");
                None
            }
            Err(RecvTimeoutError::Disconnected) => Some(Err(terminated(self.name))),
        }
    }
}

fn terminated(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("{name} pump terminated without reporting"),
    )
}
