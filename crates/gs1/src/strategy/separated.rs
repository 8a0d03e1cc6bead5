use tracing::trace;

use super::DecodeStrategy;
use crate::item::{DecodeFault, DecodedFields, Encoding};
use crate::normalize::{
    SEPARATOR_GLYPH, is_control_separator, non_empty, pad_sub_lot, repair_mojibake, slice,
    strip_aim_prefix,
};

const AI_REFERENCE: &str = "02";
const AI_LOT: &str = "10";
const AI_SUB_LOT: &str = "04";
const AI_TERMINATOR: &str = "21";

/// Segments split by control bytes, e.g. `\x1D02REF\x1D10LOT\x1D04007`.
///
/// The `Ê` glyph is the same separator here, so payloads mixing both decode
/// in one pass. A payload with no separator at all is a single segment and
/// only matches when it is a `02` reference segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlSeparatedStrategy;

impl DecodeStrategy for ControlSeparatedStrategy {
    fn encoding(&self) -> Encoding {
        Encoding::ControlSeparated
    }

    fn decode(&self, input: &str) -> Result<Option<DecodedFields>, DecodeFault> {
        let repaired = repair_mojibake(input);
        let s = strip_aim_prefix(repaired.trim());
        if !s.chars().any(is_control_separator) {
            if s.contains(SEPARATOR_GLYPH) || !s.starts_with(AI_REFERENCE) {
                return Ok(None);
            }
            return extract_segments(self.encoding(), std::iter::once(s));
        }
        extract_segments(self.encoding(), s.split(is_separator))
    }
}

/// Segments split by the `Ê` glyph, with mojibake repaired first.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphSeparatedStrategy;

impl DecodeStrategy for GlyphSeparatedStrategy {
    fn encoding(&self) -> Encoding {
        Encoding::GlyphSeparated
    }

    fn decode(&self, input: &str) -> Result<Option<DecodedFields>, DecodeFault> {
        let repaired = repair_mojibake(input);
        let s = strip_aim_prefix(repaired.trim());
        if !s.contains(SEPARATOR_GLYPH) {
            return Ok(None);
        }
        extract_segments(self.encoding(), s.split(is_separator))
    }
}

fn is_separator(c: char) -> bool {
    c == SEPARATOR_GLYPH || is_control_separator(c)
}

/// Walk `segments` (empty ones from separator runs are skipped). A later
/// segment for the same AI overrides an earlier one.
fn extract_segments<'a>(
    encoding: Encoding,
    segments: impl Iterator<Item = &'a str>,
) -> Result<Option<DecodedFields>, DecodeFault> {
    let mut reference = None;
    let mut lot = None;
    let mut sub_lot = None;

    for seg in segments.filter(|s| !s.is_empty()) {
        let Some(ai) = seg.get(..2) else {
            trace!(segment = seg, "skipping segment without a two-character AI");
            continue;
        };
        let value = slice(encoding, seg, 2..)?;
        match ai {
            AI_REFERENCE => reference = non_empty(value),
            AI_LOT => lot = non_empty(value),
            AI_SUB_LOT => sub_lot = pad_sub_lot(value),
            AI_TERMINATOR => {}
            _ => trace!(ai, "ignoring unknown AI segment"),
        }
    }

    Ok(reference.map(|reference| DecodedFields {
        reference,
        lot,
        sub_lot,
    }))
}
