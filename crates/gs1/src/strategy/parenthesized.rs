use tracing::trace;

use super::DecodeStrategy;
use crate::item::{DecodeFault, DecodedFields, Encoding};
use crate::normalize::{all_digits, non_empty, slice, strip_aim_prefix};

const AI_GTIN: &str = "01";
const AI_LOT: &str = "10";
const AI_SERIAL: &str = "21";

/// Human-readable form: `(01)12345678901234(10)LOT(21)7`.
///
/// The AI is whatever sits between a parenthesis pair (2 to 4 digits); its
/// value runs to the next `(` or the end of input. `(01)` is mandatory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParenthesizedStrategy;

impl DecodeStrategy for ParenthesizedStrategy {
    fn encoding(&self) -> Encoding {
        Encoding::Parenthesized
    }

    fn decode(&self, input: &str) -> Result<Option<DecodedFields>, DecodeFault> {
        let enc = self.encoding();
        let s = strip_aim_prefix(input.trim());
        if !s.starts_with('(') {
            return Ok(None);
        }

        let mut reference = None;
        let mut lot = None;
        let mut sub_lot = None;

        let mut rest = s;
        while !rest.is_empty() {
            // Every element starts at a '(' because values stop right before one.
            let Some(close) = rest.find(')') else {
                trace!(rest, "unclosed AI parenthesis");
                return Ok(None);
            };
            let ai = slice(enc, rest, 1..close)?;
            if !(2..=4).contains(&ai.len()) || !all_digits(ai) {
                trace!(ai, "parenthesized element is not a numeric AI");
                return Ok(None);
            }

            let after = slice(enc, rest, close + 1..)?;
            let value_end = after.find('(').unwrap_or(after.len());
            let value = slice(enc, after, ..value_end)?;

            match ai {
                AI_GTIN => reference = non_empty(value),
                AI_LOT => lot = non_empty(value),
                AI_SERIAL => sub_lot = non_empty(value),
                _ => trace!(ai, "ignoring AI"),
            }

            rest = slice(enc, after, value_end..)?;
        }

        Ok(reference.map(|reference| DecodedFields {
            reference,
            lot,
            sub_lot,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gtin_lot_and_serial_decode() {
        let decoded = ParenthesizedStrategy
            .decode("(01)12345678901234(10)LOTA(21)7")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.reference, "12345678901234");
        assert_eq!(decoded.lot.as_deref(), Some("LOTA"));
        assert_eq!(decoded.sub_lot.as_deref(), Some("7"));
    }

    #[test]
    fn unknown_ais_are_skipped() {
        let decoded = ParenthesizedStrategy
            .decode("(01)09501101530003(17)251231(10)B-1")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.reference, "09501101530003");
        assert_eq!(decoded.lot.as_deref(), Some("B-1"));
        assert_eq!(decoded.sub_lot, None);
    }

    #[test]
    fn gtin_is_required() {
        assert_eq!(ParenthesizedStrategy.decode("(10)LOT(21)4").unwrap(), None);
    }

    #[test]
    fn unclosed_parenthesis_rejects_the_shape() {
        assert_eq!(ParenthesizedStrategy.decode("(01)123(10").unwrap(), None);
    }

    #[test]
    fn leading_text_rejects_the_shape() {
        assert_eq!(ParenthesizedStrategy.decode("X(01)123").unwrap(), None);
    }

    #[test]
    fn non_numeric_ai_rejects_the_shape() {
        assert_eq!(ParenthesizedStrategy.decode("(01)123(AB)x").unwrap(), None);
    }

    #[test]
    fn empty_serial_counts_as_absent() {
        let decoded = ParenthesizedStrategy
            .decode("(01)12345678901234(21)")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.sub_lot, None);
    }
}
