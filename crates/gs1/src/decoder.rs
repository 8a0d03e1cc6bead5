use tracing::debug;

use crate::item::{DecodeFault, DecodeOutcome, DecodedItem};
use crate::strategy::{
    ConcatenatedStrategy, ControlSeparatedStrategy, DecodeStrategy, GlyphSeparatedStrategy,
    ParenthesizedStrategy,
};

/// Ordered chain of decoding strategies.
///
/// The default order is control-separated, glyph-separated, parenthesized,
/// concatenated. The first strategy that recognizes the payload wins.
#[derive(Debug)]
pub struct Gs1Decoder {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Default for Gs1Decoder {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(ControlSeparatedStrategy),
            Box::new(GlyphSeparatedStrategy),
            Box::new(ParenthesizedStrategy),
            Box::new(ConcatenatedStrategy),
        ])
    }
}

impl Gs1Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn DecodeStrategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    /// Decode `raw`.
    ///
    /// `NotDecodable` is an ordinary outcome. `Err` only signals a fault in a
    /// strategy; callers degrade it the same way as `NotDecodable`.
    pub fn decode(&self, raw: &str) -> Result<DecodeOutcome, DecodeFault> {
        if raw.trim().is_empty() {
            return Ok(DecodeOutcome::NotDecodable);
        }

        for strategy in &self.strategies {
            if let Some(fields) = strategy.decode(raw)? {
                debug!(
                    encoding = %strategy.encoding(),
                    reference = %fields.reference,
                    "decoded scan"
                );
                return Ok(DecodeOutcome::Decoded(DecodedItem::new(
                    fields,
                    raw,
                    strategy.encoding(),
                )));
            }
        }

        Ok(DecodeOutcome::NotDecodable)
    }
}
