//! GS1-like application-identifier decoding.
//!
//! Scanner firmware in the field emits the same payload in several
//! incompatible shapes. Each shape is handled by one [`DecodeStrategy`]; the
//! [`Gs1Decoder`] tries them in a fixed order and reports either the first
//! match or [`DecodeOutcome::NotDecodable`].
//!
//! No IO, no storage.

pub mod decoder;
pub mod item;
mod normalize;
pub mod strategy;

pub use decoder::Gs1Decoder;
pub use item::{DecodeFault, DecodeOutcome, DecodedFields, DecodedItem, Encoding};
pub use normalize::{is_control_separator, pad_sub_lot};
pub use strategy::{
    ConcatenatedStrategy, ControlSeparatedStrategy, DecodeStrategy, GlyphSeparatedStrategy,
    ParenthesizedStrategy,
};
