//! Output module
//!
//! Two layers, strictly stacked:
//!
//! - [`staged`] — the generic staged-output lifecycle: an in-memory buffer
//!   that is flushed to the real destination in a single write at close time
//! - [`sprite`] — the sprite framing layer on top: length-framed records
//!   with byte accounting and signed-to-unsigned field normalization

mod sprite;
mod staged;

pub use sprite::{SpriteSink, SpriteState, SpriteWriter, EXTENDED_BYTE_MARKER};
pub use staged::{OutputFile, OutputSink, StagedBuffer};
