//! Sequence length arithmetic.
//!
//! [`rune_len`] and [`sequence_len`] are two views of the same table and must
//! agree for every legal scalar: the lead byte that [`rune_len`] implies for a
//! value has exactly that many leading one-bits.

use crate::rune::{MAX_EXTENDED_RUNE, MAX_RUNE, Rune};

/// Smallest value for each sequence length, indexed by length.
const MIN_VALUE: [Rune; 7] = [0, 0, 0x80, 0x800, 0x1_0000, 0x20_0000, 0x400_0000];

/// Number of bytes needed to encode `rune`.
///
/// Lengths 5 and 6 cover the historical over-wide ranges and are never
/// produced for Unicode scalars. Values between U+10FFFF and the start of the
/// 5-byte range have no length.
#[must_use]
pub const fn rune_len(rune: Rune) -> Option<usize> {
    match rune {
        0..=0x7F => Some(1),
        0x80..=0x7FF => Some(2),
        0x800..=0xFFFF => Some(3),
        0x1_0000..=MAX_RUNE => Some(4),
        0x20_0000..=0x3FF_FFFF => Some(5),
        0x400_0000..=MAX_EXTENDED_RUNE => Some(6),
        _ => None,
    }
}

/// Sequence length announced by a lead byte.
///
/// This is the count of leading one-bits, with zero meaning a single ASCII
/// byte. A lone leading one is a continuation byte and cannot start a
/// sequence; seven or eight leading ones (`0xFE`, `0xFF`) are never part of
/// UTF-8.
#[must_use]
pub const fn sequence_len(lead: u8) -> Option<usize> {
    match lead.leading_ones() {
        0 => Some(1),
        n @ 2..=6 => Some(n as usize),
        _ => None,
    }
}

/// Smallest value that genuinely needs `len` bytes.
///
/// # Panics
///
/// Panics if `len` is greater than 6.
#[must_use]
pub const fn min_value(len: usize) -> Rune {
    MIN_VALUE[len]
}

/// Payload bits carried by a lead byte of a `len`-byte sequence.
#[inline]
pub(crate) const fn lead_payload(lead: u8, len: usize) -> Rune {
    if len == 1 {
        return lead as Rune;
    }
    (lead & (0x7F >> len)) as Rune
}

/// Whether `byte` has the `10xxxxxx` shape.
#[inline]
#[must_use]
pub const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Lower bound on the value built from the lead byte and the first
/// continuation byte of a `len`-byte sequence. Anything below it could have
/// been written with fewer bytes.
#[inline]
pub(crate) const fn min_partial(len: usize) -> Rune {
    MIN_VALUE[len] >> (6 * (len - 2))
}
