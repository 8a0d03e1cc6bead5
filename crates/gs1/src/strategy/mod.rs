//! Payload shapes, one strategy per shape.

mod concatenated;
mod parenthesized;
mod separated;

pub use concatenated::ConcatenatedStrategy;
pub use parenthesized::ParenthesizedStrategy;
pub use separated::{ControlSeparatedStrategy, GlyphSeparatedStrategy};

use crate::item::{DecodeFault, DecodedFields, Encoding};

/// One decoding variant.
///
/// `Ok(None)` means "not my shape" and lets the decoder try the next
/// strategy. `Err` is reserved for internal faults.
pub trait DecodeStrategy: Send + Sync + core::fmt::Debug {
    fn encoding(&self) -> Encoding;

    fn decode(&self, input: &str) -> Result<Option<DecodedFields>, DecodeFault>;
}
