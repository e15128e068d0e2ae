//! Staged output lifecycle.
//!
//! Everything written between `open` and `close` lands in an in-memory
//! staging buffer. The real destination is opened through the
//! [`OutputSink`] seam exactly once, at close time, and receives a single
//! bulk write. A run that aborts before `close` never touches the
//! destination, so a failed compilation cannot leave a half-written file
//! behind.

use std::io::Write;

use crate::error::{OutputError, Result};

/// In-memory staging area for one output file.
///
/// The buffer only exists between [`StagedBuffer::open`] and the final
/// flush; writes outside that window fail with [`OutputError::NotOpen`].
#[derive(Debug)]
pub struct StagedBuffer {
    destination: String,
    staging: Option<Vec<u8>>,
}

impl StagedBuffer {
    /// Create a staging buffer for the given destination. No buffer is
    /// allocated until [`StagedBuffer::open`].
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            staging: None,
        }
    }

    /// Identifier of the eventual real destination.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Allocate a fresh staging buffer. Opening twice discards anything
    /// staged so far.
    pub fn open(&mut self) {
        self.staging = Some(Vec::new());
    }

    /// Whether a staging buffer currently exists.
    pub fn is_open(&self) -> bool {
        self.staging.is_some()
    }

    /// Append raw bytes to the staging buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.staging
            .as_mut()
            .ok_or(OutputError::NotOpen)?
            .extend_from_slice(bytes);
        Ok(())
    }

    /// Append UTF-8 text to the staging buffer.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Number of bytes staged so far.
    pub fn staged_len(&self) -> usize {
        self.staging.as_ref().map_or(0, Vec::len)
    }

    /// View of the staged bytes.
    pub fn staged(&self) -> Result<&[u8]> {
        self.staging
            .as_deref()
            .ok_or(OutputError::NotOpen)
    }

    /// Mutable access to the staged bytes.
    pub fn staged_mut(&mut self) -> Result<&mut Vec<u8>> {
        self.staging
            .as_mut()
            .ok_or(OutputError::NotOpen)
    }

    /// Write the entire staged contents into `sink` and release the buffer.
    pub fn flush_into(&mut self, sink: &mut dyn Write) -> Result<()> {
        let staged = self.staging.take().ok_or(OutputError::NotOpen)?;
        sink.write_all(&staged)?;
        Ok(())
    }
}

/// Capability seam for the generic output lifecycle.
///
/// A concrete sink supplies the destination opener and may override the
/// remaining hooks. The default `open_destination` reports the sink as
/// incomplete, the Rust rendition of an abstract base method.
pub trait OutputSink {
    /// Open the real destination for the final flush. Invoked exactly once,
    /// at close time.
    fn open_destination(&mut self, name: &str) -> Result<Box<dyn Write>> {
        let _ = name;
        Err(OutputError::NotImplemented("open_destination".to_string()))
    }

    /// Last chance to append staged data before the file is closed.
    fn before_close(&mut self, staging: &mut Vec<u8>) -> Result<()> {
        let _ = staging;
        Ok(())
    }

    /// Whether this sink needs sprites parsed in full detail. Sinks that
    /// discard structural detail return `false` so the compiler can skip
    /// the validation work.
    fn wants_sprite_details(&self) -> bool {
        false
    }
}

/// Staged output file over a concrete sink.
///
/// Lifecycle: [`OutputFile::open`] allocates the staging buffer, writes
/// accumulate in memory, and [`OutputFile::close`] runs the sink's
/// `before_close` hook, opens the destination, and copies the staged
/// contents into it in one write.
#[derive(Debug)]
pub struct OutputFile<S: OutputSink> {
    buffer: StagedBuffer,
    sink: S,
}

impl<S: OutputSink> OutputFile<S> {
    /// Create an output file for `destination` backed by `sink`.
    pub fn new(destination: impl Into<String>, sink: S) -> Self {
        Self {
            buffer: StagedBuffer::new(destination),
            sink,
        }
    }

    /// Identifier of the eventual real destination.
    pub fn destination(&self) -> &str {
        self.buffer.destination()
    }

    /// Open the output. Data gets staged in memory.
    pub fn open(&mut self) {
        self.buffer.open();
    }

    /// Whether the output is open.
    pub fn is_open(&self) -> bool {
        self.buffer.is_open()
    }

    /// Append raw bytes to the staging buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.write_bytes(bytes)
    }

    /// Append UTF-8 text to the staging buffer.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.buffer.write_str(text)
    }

    /// Number of bytes staged so far.
    pub fn staged_len(&self) -> usize {
        self.buffer.staged_len()
    }

    /// View of the staged bytes.
    pub fn staged(&self) -> Result<&[u8]> {
        self.buffer.staged()
    }

    /// The sink backing this output.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Split borrow: the sink together with the staging buffer, for
    /// encoder hooks that append to the staged output.
    pub(crate) fn sink_and_staging(&mut self) -> Result<(&mut S, &mut Vec<u8>)> {
        let staging = self
            .buffer
            .staging
            .as_mut()
            .ok_or(OutputError::NotOpen)?;
        Ok((&mut self.sink, staging))
    }

    /// Whether the sink needs sprites parsed in full detail.
    pub fn wants_sprite_details(&self) -> bool {
        self.sink.wants_sprite_details()
    }

    /// Close the output: run the sink's `before_close` hook, open the real
    /// destination, copy the staged contents into it, and release the
    /// staging buffer. This is the only point where the destination is
    /// touched.
    pub fn close(&mut self) -> Result<()> {
        {
            let (sink, staging) = self.sink_and_staging()?;
            sink.before_close(staging)?;
        }
        let mut dest = self.sink.open_destination(self.buffer.destination())?;
        self.buffer.flush_into(&mut *dest)?;
        dest.flush()?;
        Ok(())
    }
}
