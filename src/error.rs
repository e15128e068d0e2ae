//! Error types for the output layer

use std::io;
use thiserror::Error;

/// Main error type for output operations.
///
/// Every variant except [`OutputError::Io`] reports an internal-consistency
/// failure of the emitting compiler, not an environmental condition. None of
/// them are recoverable: the caller is expected to abort the current output
/// unit.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error while flushing staged output to the destination
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A field was written while no sprite is open
    #[error("{0} called outside of a sprite")]
    NotInSprite(&'static str),

    /// A sprite was started while the previous one is still open
    #[error("sprite started while another sprite is still open")]
    SpriteAlreadyOpen,

    /// A sprite was ended while none is open
    #[error("sprite ended while no sprite is open")]
    NoSpriteOpen,

    /// The output was closed while a sprite is still open
    #[error("output closed while a sprite is still open")]
    SpriteStillOpen,

    /// A value does not fit its field width, even after wraparound
    #[error("value {value} does not fit in a {width}-bit field")]
    ValueOutOfRange { value: i64, width: u8 },

    /// Variable-width dispatch with a size outside 1..=4
    #[error("unsupported field size: {0}")]
    UnsupportedSize(u8),

    /// Declared sprite length differs from the bytes actually written
    #[error("expected {expected} bytes to be written to sprite, got {actual}")]
    SpriteSizeMismatch { expected: u32, actual: u32 },

    /// A capability hook was invoked on a sink that does not supply it
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Staged output accessed before `open` or after `close`
    #[error("output file is not open")]
    NotOpen,
}

/// Result type alias for output operations
pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = OutputError::SpriteSizeMismatch {
            expected: 5,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "expected 5 bytes to be written to sprite, got 4"
        );
    }

    #[test]
    fn test_out_of_range_display() {
        let err = OutputError::ValueOutOfRange {
            value: 256,
            width: 8,
        };
        assert!(err.to_string().contains("256"));
        assert!(err.to_string().contains("8-bit"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OutputError = io_err.into();
        assert!(matches!(err, OutputError::Io(_)));
    }
}
