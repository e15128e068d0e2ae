//! Sprite-framed output.
//!
//! A sprite is a length-framed record: the emitter declares the byte count
//! up front and every field written inside the sprite is accounted against
//! it. At the end of the sprite the declared and written counts must agree
//! exactly; a mismatch means the compiler miscalculated a sprite length and
//! aborts the output unit.
//!
//! Field values arrive as signed integers and are normalized to the
//! unsigned representative of their field width before they reach the
//! encoder: a negative value in the lower half of the signed range wraps
//! around (two's complement), anything else out of range is fatal.

use crate::error::{OutputError, Result};
use crate::output::staged::{OutputFile, OutputSink};

/// Marker byte announcing that an extended-byte field carries its value in
/// the following word.
pub const EXTENDED_BYTE_MARKER: u8 = 0xFF;

/// Frame accounting state for the sprite currently being written.
///
/// Kept separate from the writer so the state machine can be tested
/// without any sink attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpriteState {
    in_sprite: bool,
    expected: u32,
    written: u32,
}

impl SpriteState {
    /// Begin a sprite expected to hold `expected` bytes.
    pub fn begin(&mut self, expected: u32) -> Result<()> {
        if self.in_sprite {
            return Err(OutputError::SpriteAlreadyOpen);
        }
        self.in_sprite = true;
        self.expected = expected;
        self.written = 0;
        Ok(())
    }

    /// End the sprite. The size check is a separate step so a trailing
    /// record separator can be emitted between the two.
    pub fn end(&mut self) -> Result<()> {
        if !self.in_sprite {
            return Err(OutputError::NoSpriteOpen);
        }
        self.in_sprite = false;
        Ok(())
    }

    /// Check that the declared and written byte counts agree.
    pub fn verify_size(&self) -> Result<()> {
        if self.expected != self.written {
            return Err(OutputError::SpriteSizeMismatch {
                expected: self.expected,
                actual: self.written,
            });
        }
        Ok(())
    }

    /// Fail if a sprite is still open. Called before the output is
    /// finalized.
    pub fn assert_idle(&self) -> Result<()> {
        if self.in_sprite {
            return Err(OutputError::SpriteStillOpen);
        }
        Ok(())
    }

    /// Whether a sprite is currently open.
    pub fn in_sprite(&self) -> bool {
        self.in_sprite
    }

    /// Declared length of the current sprite.
    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Bytes written to the current sprite so far.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Normalize `value` to an unsigned byte and account for it.
    pub fn prepare_byte(&mut self, mut value: i64) -> Result<u8> {
        if !self.in_sprite {
            return Err(OutputError::NotInSprite("prepare_byte"));
        }
        if (-0x80..0).contains(&value) {
            value += 0x100;
        }
        if !(0..=0xFF).contains(&value) {
            return Err(OutputError::ValueOutOfRange { value, width: 8 });
        }
        self.written += 1;
        Ok(value as u8)
    }

    /// Normalize `value` to an unsigned word and account for it.
    pub fn prepare_word(&mut self, mut value: i64) -> Result<u16> {
        if !self.in_sprite {
            return Err(OutputError::NotInSprite("prepare_word"));
        }
        if (-0x8000..0).contains(&value) {
            value += 0x1_0000;
        }
        if !(0..=0xFFFF).contains(&value) {
            return Err(OutputError::ValueOutOfRange { value, width: 16 });
        }
        self.written += 2;
        Ok(value as u16)
    }

    /// Normalize `value` to an unsigned double word and account for it.
    pub fn prepare_dword(&mut self, mut value: i64) -> Result<u32> {
        if !self.in_sprite {
            return Err(OutputError::NotInSprite("prepare_dword"));
        }
        if (-0x8000_0000..0).contains(&value) {
            value += 0x1_0000_0000;
        }
        if !(0..=0xFFFF_FFFF).contains(&value) {
            return Err(OutputError::ValueOutOfRange { value, width: 32 });
        }
        self.written += 4;
        Ok(value as u32)
    }
}

/// Capability seam for sprite-emitting sinks.
///
/// Hooks receive already-normalized, range-checked values and append their
/// encoding to the staging buffer. A sink that never emits sprites (a
/// dependency-listing destination, say) leaves the defaults in place.
pub trait SpriteSink: OutputSink {
    /// Encode one byte field. `hint` carries an optional human-readable
    /// rendering of the value and must not affect the bytes written.
    fn write_byte(&mut self, out: &mut Vec<u8>, value: u8, hint: Option<&str>) -> Result<()> {
        let _ = (out, value, hint);
        Err(OutputError::NotImplemented("write_byte".to_string()))
    }

    /// Encode one word field (2 bytes).
    fn write_word(&mut self, out: &mut Vec<u8>, value: u16) -> Result<()> {
        let _ = (out, value);
        Err(OutputError::NotImplemented("write_word".to_string()))
    }

    /// Encode one double word field (4 bytes).
    fn write_dword(&mut self, out: &mut Vec<u8>, value: u32) -> Result<()> {
        let _ = (out, value);
        Err(OutputError::NotImplemented("write_dword".to_string()))
    }

    /// Emit a record separator, with `annotation` rendered as a trailing
    /// comment behind `indent` when non-empty. Only valid when no partial
    /// value is pending on the current line.
    fn newline(&mut self, out: &mut Vec<u8>, annotation: &str, indent: &str) -> Result<()> {
        let _ = (out, annotation, indent);
        Err(OutputError::NotImplemented("newline".to_string()))
    }

    /// Emit a standalone comment line. Only valid when no partial value is
    /// pending on the current line.
    fn comment(&mut self, out: &mut Vec<u8>, annotation: &str) -> Result<()> {
        let _ = (out, annotation);
        Err(OutputError::NotImplemented("comment".to_string()))
    }
}

/// Sprite-framed output file over a concrete sink.
///
/// Wraps the staged lifecycle of [`OutputFile`] and adds the sprite frame
/// state machine: fields can only be written inside a sprite, every write
/// is normalized and accounted, and closing while a sprite is open is
/// refused.
#[derive(Debug)]
pub struct SpriteWriter<S: SpriteSink> {
    file: OutputFile<S>,
    state: SpriteState,
}

impl<S: SpriteSink> SpriteWriter<S> {
    /// Create a sprite writer for `destination` backed by `sink`.
    pub fn new(destination: impl Into<String>, sink: S) -> Self {
        Self {
            file: OutputFile::new(destination, sink),
            state: SpriteState::default(),
        }
    }

    /// Identifier of the eventual real destination.
    pub fn destination(&self) -> &str {
        self.file.destination()
    }

    /// Open the output. Data gets staged in memory.
    pub fn open(&mut self) {
        self.file.open();
    }

    /// Whether the output is open.
    pub fn is_open(&self) -> bool {
        self.file.is_open()
    }

    /// Number of bytes staged so far.
    pub fn staged_len(&self) -> usize {
        self.file.staged_len()
    }

    /// View of the staged bytes.
    pub fn staged(&self) -> Result<&[u8]> {
        self.file.staged()
    }

    /// The sink backing this output.
    pub fn sink(&self) -> &S {
        self.file.sink()
    }

    /// The frame state, for callers that track emission progress.
    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    /// Whether the sink needs sprites parsed in full detail.
    pub fn wants_sprite_details(&self) -> bool {
        self.file.wants_sprite_details()
    }

    /// Begin a sprite expected to hold `expected` bytes.
    pub fn start_sprite(&mut self, expected: u32) -> Result<()> {
        self.state.begin(expected)
    }

    /// End the current sprite: emit a trailing record separator, then check
    /// that exactly the declared number of bytes was written.
    pub fn end_sprite(&mut self) -> Result<()> {
        self.state.end()?;
        self.newline("", "\t")?;
        self.state.verify_size()
    }

    /// Write one byte field. `hint` optionally carries a human-readable
    /// rendering for text sinks.
    pub fn print_byte(&mut self, value: i64, hint: Option<&str>) -> Result<()> {
        let value = self.state.prepare_byte(value)?;
        let (sink, staging) = self.file.sink_and_staging()?;
        sink.write_byte(staging, value, hint)
    }

    /// Write one word field (2 bytes).
    pub fn print_word(&mut self, value: i64) -> Result<()> {
        let value = self.state.prepare_word(value)?;
        let (sink, staging) = self.file.sink_and_staging()?;
        sink.write_word(staging, value)
    }

    /// Write one double word field (4 bytes).
    pub fn print_dword(&mut self, value: i64) -> Result<()> {
        let value = self.state.prepare_dword(value)?;
        let (sink, staging) = self.file.sink_and_staging()?;
        sink.write_dword(staging, value)
    }

    /// Write a variable-width field. `size` 1, 2 and 4 map to byte, word
    /// and double word; 3 is the extended-byte encoding: the marker byte
    /// `0xFF` followed by the value as a word.
    pub fn print_var(&mut self, value: i64, size: u8) -> Result<()> {
        match size {
            1 => self.print_byte(value, None),
            2 => self.print_word(value),
            3 => {
                self.print_byte(i64::from(EXTENDED_BYTE_MARKER), None)?;
                self.print_word(value)
            }
            4 => self.print_dword(value),
            other => Err(OutputError::UnsupportedSize(other)),
        }
    }

    /// Emit a record separator, with `annotation` as a trailing comment
    /// behind `indent` when non-empty.
    pub fn newline(&mut self, annotation: &str, indent: &str) -> Result<()> {
        let (sink, staging) = self.file.sink_and_staging()?;
        sink.newline(staging, annotation, indent)
    }

    /// Emit a standalone comment line.
    pub fn comment(&mut self, annotation: &str) -> Result<()> {
        let (sink, staging) = self.file.sink_and_staging()?;
        sink.comment(staging, annotation)
    }

    /// Close the output: refuse if a sprite is still open, then flush the
    /// staged contents to the real destination.
    pub fn close(&mut self) -> Result<()> {
        self.state.assert_idle()?;
        self.file.close()
    }
}
