//! # grf-output-rs
//!
//! A pure Rust output layer for compilers that emit sprite-based GRF data
//! files.
//!
//! The crate owns the output discipline, not the output format: it stages
//! everything in memory, frames the stream into length-checked sprites,
//! and normalizes signed field values to their unsigned wire
//! representation. What a byte, word or comment looks like on disk is
//! decided by the sink behind the [`output::SpriteSink`] seam.
//!
//! ## Features
//!
//! - Two-stage writing: output accumulates in memory and the destination
//!   file is only opened and written once, at close time, so an aborted
//!   compilation never leaves a corrupt file behind
//! - Sprite framing with exact byte accounting: a sprite declares its
//!   length up front and closing it with a different number of bytes
//!   written is a hard error
//! - Signed-to-unsigned normalization for byte, word and double word
//!   fields with two's-complement wraparound and range validation
//! - Variable-width fields, including the extended-byte encoding (a
//!   `0xFF` marker byte followed by a word value)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use grf_output_rs::{SpriteWriter, SpriteSink};
//!
//! let mut writer = SpriteWriter::new("out.grf", sink);
//! writer.open();
//! writer.start_sprite(4)?;
//! writer.print_byte(-1, None)?;   // wraps to 0xFF
//! writer.print_word(300)?;
//! writer.print_byte(5, None)?;
//! writer.end_sprite()?;           // 1 + 2 + 1 == 4, ok
//! writer.close()?;                // single bulk write to out.grf
//! # Ok::<(), grf_output_rs::OutputError>(())
//! ```

pub mod error;
pub mod output;

// Re-export commonly used types
pub use error::{OutputError, Result};
pub use output::{
    OutputFile, OutputSink, SpriteSink, SpriteState, SpriteWriter, StagedBuffer,
    EXTENDED_BYTE_MARKER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
