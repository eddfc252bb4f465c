//! Which values the codec accepts: surrogates and noncharacters are told
//! apart from the scalars that may appear in interchanged text.

use crate::rune::{MAX_RUNE, Rune};

/// Whether `rune` lies anywhere in U+D800..=U+DFFF.
#[inline]
#[must_use]
pub const fn is_surrogate(rune: Rune) -> bool {
    matches!(rune, 0xD800..=0xDFFF)
}

/// Whether `rune` is the leading half of a surrogate pair.
#[inline]
#[must_use]
pub const fn is_high_surrogate(rune: Rune) -> bool {
    matches!(rune, 0xD800..=0xDBFF)
}

/// Whether `rune` is the trailing half of a surrogate pair.
#[inline]
#[must_use]
pub const fn is_low_surrogate(rune: Rune) -> bool {
    matches!(rune, 0xDC00..=0xDFFF)
}

/// Whether `rune` is a permanently unassigned noncharacter: the
/// U+FDD0..=U+FDEF block, or the last two code points of any plane.
#[inline]
#[must_use]
pub const fn is_noncharacter(rune: Rune) -> bool {
    matches!(rune, 0xFDD0..=0xFDEF) || (rune <= MAX_RUNE && rune & 0xFFFE == 0xFFFE)
}

/// Whether a completed value may be handed out by the decoder.
///
/// Rejects surrogates, noncharacters, and anything above U+10FFFF, no matter
/// how the value was produced.
#[must_use]
pub const fn is_valid_rune(rune: Rune) -> bool {
    !is_surrogate(rune) && !is_noncharacter(rune) && rune <= MAX_RUNE
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0x0000, true)]
    #[case(0x0041, true)]
    #[case(0xD7FF, true)]
    #[case(0xD800, false)]
    #[case(0xDBFF, false)]
    #[case(0xDC00, false)]
    #[case(0xDFFF, false)]
    #[case(0xE000, true)]
    #[case(0xFDCF, true)]
    #[case(0xFDD0, false)]
    #[case(0xFDEF, false)]
    #[case(0xFDF0, true)]
    #[case(0xFFFD, true)]
    #[case(0xFFFE, false)]
    #[case(0xFFFF, false)]
    #[case(0x1_0000, true)]
    #[case(0x1_FFFE, false)]
    #[case(0x1_FFFF, false)]
    #[case(0x10_FFFD, true)]
    #[case(0x10_FFFE, false)]
    #[case(0x10_FFFF, false)]
    #[case(0x11_0000, false)]
    #[case(0x7FFF_FFFF, false)]
    fn validity(#[case] rune: Rune, #[case] expected: bool) {
        assert_eq!(is_valid_rune(rune), expected, "U+{rune:04X}");
    }

    #[test]
    fn surrogate_halves() {
        assert!(is_high_surrogate(0xD800) && is_high_surrogate(0xDBFF));
        assert!(!is_high_surrogate(0xDC00));
        assert!(is_low_surrogate(0xDC00) && is_low_surrogate(0xDFFF));
        assert!(!is_low_surrogate(0xDBFF));
        assert!(is_surrogate(0xDABC));
        assert!(!is_surrogate(0xE000));
    }

    #[test]
    fn noncharacters_stop_at_last_plane() {
        assert!(is_noncharacter(0x10_FFFF));
        assert!(!is_noncharacter(0x11_FFFF));
    }
}
