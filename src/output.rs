use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination shared by a sink and every sink derived from it.
///
/// Each call to [`SharedWriter::write_line`] holds the lock for the whole
/// line, so lines written from different threads never interleave.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
    label: &'static str,
}

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        SharedWriter {
            inner: Arc::new(Mutex::new(Box::new(writer))),
            label: std::any::type_name::<W>(),
        }
    }

    pub fn stdout() -> Self {
        SharedWriter {
            inner: Arc::new(Mutex::new(Box::new(io::stdout()))),
            label: "stdout",
        }
    }

    pub fn stderr() -> Self {
        SharedWriter {
            inner: Arc::new(Mutex::new(Box::new(io::stderr()))),
            label: "stderr",
        }
    }

    /// Write one encoded record and flush. No buffering and no retry.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut w = self.lock();
        w.write_all(line)?;
        w.flush()
    }

    /// Whether both handles point at the same destination.
    pub fn same_as(&self, other: &SharedWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWriter").field("label", &self.label).finish()
    }
}

/// In-memory destination for capturing log output.
///
/// Clones share the same buffer: hand one clone to a sink and read the
/// lines back from another.
#[derive(Clone, Debug, Default)]
pub struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Shared handle writing into this buffer.
    pub fn shared(&self) -> SharedWriter {
        SharedWriter::new(self.clone())
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("buffer mutex poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
