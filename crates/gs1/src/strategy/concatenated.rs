use tracing::{debug, trace};

use super::DecodeStrategy;
use crate::item::{DecodeFault, DecodedFields, Encoding};
use crate::normalize::{all_digits, is_control_separator, non_empty, slice, strip_aim_prefix};

const AI_GTIN: &str = "01";
const GTIN_LEN: usize = 14;
const AI_LOT: &str = "10";
const AI_SERIAL: &str = "21";

/// Date AIs (production, packaging, best-before, expiry): six digits, no separator.
const FIXED_DATE_AIS: [&str; 4] = ["11", "13", "15", "17"];
const DATE_LEN: usize = 6;

/// Flat form: `01` + GTIN-14, then AIs with no parentheses.
///
/// Variable-length values (`10`, `21`) end at a control separator or at the
/// end of input. A bare trailing `21` is a terminator, and a lot that runs to
/// the end and finishes with `21` loses that terminator. The first AI this
/// strategy does not know stops the walk; whatever was decoded until then is
/// kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcatenatedStrategy;

impl DecodeStrategy for ConcatenatedStrategy {
    fn encoding(&self) -> Encoding {
        Encoding::Concatenated
    }

    fn decode(&self, input: &str) -> Result<Option<DecodedFields>, DecodeFault> {
        let enc = self.encoding();
        let s = strip_aim_prefix(input.trim()).trim_start_matches(is_control_separator);

        let Some(after_ai) = s.strip_prefix(AI_GTIN) else {
            return Ok(None);
        };
        let gtin = match after_ai.get(..GTIN_LEN) {
            Some(g) if all_digits(g) => g,
            _ => return Ok(None),
        };

        let mut lot = None;
        let mut sub_lot = None;
        let mut rest = slice(enc, after_ai, GTIN_LEN..)?;

        loop {
            rest = rest.trim_start_matches(is_control_separator);
            if rest.is_empty() || rest == AI_SERIAL {
                break;
            }
            let Some(ai) = rest.get(..2) else {
                break;
            };

            match ai {
                AI_LOT | AI_SERIAL => {
                    let body = slice(enc, rest, 2..)?;
                    let end = body.find(is_control_separator);
                    let mut value = slice(enc, body, ..end.unwrap_or(body.len()))?;
                    if ai == AI_LOT && end.is_none() {
                        if let Some(stripped) = value.strip_suffix(AI_SERIAL) {
                            if !stripped.is_empty() {
                                value = stripped;
                            }
                        }
                    }
                    if ai == AI_LOT {
                        lot = non_empty(value);
                    } else {
                        sub_lot = non_empty(value);
                    }
                    rest = match end {
                        Some(i) => slice(enc, body, i..)?,
                        None => "",
                    };
                }
                _ if FIXED_DATE_AIS.contains(&ai) => {
                    match rest.get(2..2 + DATE_LEN) {
                        Some(date) if all_digits(date) => {
                            trace!(ai, date, "skipping fixed-length date AI");
                            rest = slice(enc, rest, 2 + DATE_LEN..)?;
                        }
                        _ => break,
                    }
                }
                _ => {
                    debug!(ai, "stopping at unrecognized AI");
                    break;
                }
            }
        }

        Ok(Some(DecodedFields {
            reference: gtin.to_string(),
            lot,
            sub_lot,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GTIN: &str = "12345678901234";

    fn decode(input: &str) -> Option<DecodedFields> {
        ConcatenatedStrategy.decode(input).unwrap()
    }

    #[test]
    fn bare_gtin_decodes() {
        let decoded = decode("0112345678901234").unwrap();
        assert_eq!(decoded.reference, GTIN);
        assert_eq!(decoded.lot, None);
        assert_eq!(decoded.sub_lot, None);
    }

    #[test]
    fn short_gtin_is_not_this_shape() {
        assert_eq!(decode("011234567890"), None);
        assert_eq!(decode("01123456789012AB"), None);
    }

    #[test]
    fn trailing_lot_runs_to_end_and_drops_terminator() {
        let decoded = decode("011234567890123410LOT9921").unwrap();
        assert_eq!(decoded.lot.as_deref(), Some("LOT99"));
    }

    #[test]
    fn bare_trailing_terminator_closes_the_record() {
        let decoded = decode("011234567890123421").unwrap();
        assert_eq!(decoded.reference, GTIN);
        assert_eq!(decoded.sub_lot, None);
    }

    #[test]
    fn serial_becomes_sub_lot() {
        let decoded = decode("011234567890123421SN42").unwrap();
        assert_eq!(decoded.sub_lot.as_deref(), Some("SN42"));
    }

    #[test]
    fn control_separator_ends_a_variable_field() {
        let decoded = decode("011234567890123410LOTA\x1D21SN1").unwrap();
        assert_eq!(decoded.lot.as_deref(), Some("LOTA"));
        assert_eq!(decoded.sub_lot.as_deref(), Some("SN1"));
    }

    #[test]
    fn date_ais_are_skipped() {
        let decoded = decode("01123456789012341726123110B7").unwrap();
        assert_eq!(decoded.lot.as_deref(), Some("B7"));
    }

    #[test]
    fn unknown_ai_stops_without_failing() {
        let decoded = decode("011234567890123499XYZ10LOT").unwrap();
        assert_eq!(decoded.reference, GTIN);
        assert_eq!(decoded.lot, None);
    }

    #[test]
    fn other_leading_ai_is_not_this_shape() {
        assert_eq!(decode("0212345678901234"), None);
        assert_eq!(decode("PLAINCODE123"), None);
    }
}
