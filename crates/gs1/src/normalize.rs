//! String helpers shared by the strategies.

use std::slice::SliceIndex;

use crate::item::{DecodeFault, Encoding};

/// AIM symbology identifier some scanners prepend to GS1-128 payloads.
const AIM_GS1_128: &str = "]C1";

/// Glyph emitted by some firmware in place of the GS control byte.
pub(crate) const SEPARATOR_GLYPH: char = 'Ê';

/// `Ê` read back as Latin-1 after being sent as UTF-8.
const MOJIBAKE_GLYPH: &str = "ÃŠ";

/// Stray lead byte left over by the same mis-decoding.
const STRAY_LEAD: char = 'Â';

const SUB_LOT_WIDTH: usize = 5;

/// Control characters (U+0000..=U+001F) act as field separators.
pub fn is_control_separator(c: char) -> bool {
    (c as u32) < 0x20
}

pub(crate) fn strip_aim_prefix(s: &str) -> &str {
    s.strip_prefix(AIM_GS1_128).unwrap_or(s)
}

pub(crate) fn repair_mojibake(s: &str) -> String {
    s.replace(MOJIBAKE_GLYPH, "Ê").replace(STRAY_LEAD, "")
}

/// Trimmed value, or `None` if nothing is left.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Normalize a sub-lot value: numeric values are left-padded to five digits,
/// anything else passes through trimmed. Longer numeric values are kept whole.
pub fn pad_sub_lot(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() {
        return None;
    }
    if t.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{t:0>width$}", width = SUB_LOT_WIDTH))
    } else {
        Some(t.to_string())
    }
}

pub(crate) fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Checked slice; an off-boundary index is reported as a fault of `strategy`.
pub(crate) fn slice<R>(strategy: Encoding, s: &str, range: R) -> Result<&str, DecodeFault>
where
    R: SliceIndex<str, Output = str> + core::fmt::Debug + Clone,
{
    s.get(range.clone()).ok_or_else(|| {
        DecodeFault::new(
            strategy,
            format!("range {range:?} is not on a char boundary of a {}-byte input", s.len()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_sub_lots_are_padded_to_five_digits() {
        assert_eq!(pad_sub_lot("7").as_deref(), Some("00007"));
        assert_eq!(pad_sub_lot(" 007 ").as_deref(), Some("00007"));
        assert_eq!(pad_sub_lot("12345").as_deref(), Some("12345"));
        assert_eq!(pad_sub_lot("1234567").as_deref(), Some("1234567"));
    }

    #[test]
    fn non_numeric_sub_lots_pass_through() {
        assert_eq!(pad_sub_lot("A7").as_deref(), Some("A7"));
        assert_eq!(pad_sub_lot("  "), None);
    }

    #[test]
    fn mojibake_is_repaired_to_the_separator_glyph() {
        assert_eq!(repair_mojibake("02REFÃŠ10L1"), "02REFÊ10L1");
        assert_eq!(repair_mojibake("02REFÂÊ10L1"), "02REFÊ10L1");
    }

    #[test]
    fn aim_prefix_is_stripped_once() {
        assert_eq!(strip_aim_prefix("]C1(01)123"), "(01)123");
        assert_eq!(strip_aim_prefix("(01)123"), "(01)123");
    }

    #[test]
    fn slice_reports_a_fault_off_a_char_boundary() {
        let err = slice(Encoding::Parenthesized, "Ê", 1..).unwrap_err();
        assert_eq!(err.strategy, Encoding::Parenthesized);
    }
}
