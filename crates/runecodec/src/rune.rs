//! Rune storage.
//!
//! A [`Rune`] is a plain `u32` carrying either a Unicode scalar value or, when
//! decoding into 16-bit storage, a single UTF-16 code unit. The decoder and
//! encoder are generic over [`CodeUnit`], which decides whether a 4-byte
//! sequence fits into one output value or has to be split into a surrogate
//! pair.

use core::fmt::Debug;

/// A decoded scalar value (or, for 16-bit storage, one code unit).
pub type Rune = u32;

/// Largest Unicode scalar value.
pub const MAX_RUNE: Rune = 0x10_FFFF;

/// Largest value reachable by the legacy 6-byte form.
pub const MAX_EXTENDED_RUNE: Rune = 0x7FFF_FFFF;

/// Longest sequence the decoder will collect, counting legacy forms.
pub const MAX_SEQUENCE_LEN: usize = 6;

/// Longest sequence RFC 3629 permits.
pub const MAX_UTF8_LEN: usize = 4;

/// U+FFFD, substituted by the lossy conversions.
pub const REPLACEMENT_RUNE: Rune = 0xFFFD;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u16 {}
}

/// Output storage for decoded runes.
///
/// `u32` is *wide*: every scalar value fits. `u16` is *narrow*: scalars above
/// U+FFFF are emitted as a high and a low surrogate over two calls, and the
/// encoder joins surrogate pairs back into a single 4-byte sequence.
pub trait CodeUnit: sealed::Sealed + Copy + Eq + Debug + Send + Sync + 'static {
    /// Whether a full 21-bit scalar fits into one value.
    const WIDE: bool;

    /// Store `rune`, truncating to the width of `Self`.
    ///
    /// The decoder only calls this with values that fit.
    fn from_rune(rune: Rune) -> Self;

    /// Widen back to a [`Rune`].
    fn to_rune(self) -> Rune;
}

impl CodeUnit for u32 {
    const WIDE: bool = true;

    #[inline]
    fn from_rune(rune: Rune) -> Self {
        rune
    }

    #[inline]
    fn to_rune(self) -> Rune {
        self
    }
}

impl CodeUnit for u16 {
    const WIDE: bool = false;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_rune(rune: Rune) -> Self {
        rune as u16
    }

    #[inline]
    fn to_rune(self) -> Rune {
        Rune::from(self)
    }
}
