//! Per-stream state.
//!
//! A [`Context`] is the only memory the codec has between calls. It is small,
//! plain data, owned by whoever drives one logical stream; two streams never
//! share one. Everything the decoder or encoder has not finished yet lives in
//! [`Pending`], a tagged state that says explicitly which kind of work is
//! outstanding.

use core::fmt;

use bstr::BStr;

use crate::{
    CodeUnit,
    decode::{Decoded, decode_rune},
    encode::encode_rune,
    error::{CodecError, ErrorCode},
    options::{ByteOrder, CodecOptions},
    rune::MAX_SEQUENCE_LEN,
};

/// Work left over from an earlier call.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Pending {
    /// Nothing outstanding.
    #[default]
    Idle,
    /// Raw bytes of a sequence cut off by the end of a window. Only kept
    /// between calls in [`TruncationMode::Carry`](crate::TruncationMode).
    Collecting {
        bytes: [u8; MAX_SEQUENCE_LEN],
        have: u8,
        expected: u8,
    },
    /// A byte-order mark scan saw its first byte and waits for the partner.
    ByteOrderMark { first: u8 },
    /// A 4-byte sequence was split for 16-bit storage and the high surrogate
    /// already went out. `tail` holds the raw bytes 3 and 4, of which the
    /// caller still has to hand over the last `needs`.
    LowHalf { tail: [u8; 2], low: u16, needs: u8 },
    /// The encoder holds the upper bits of a scalar announced by a high
    /// surrogate.
    HighHalf { bits: u32 },
}

impl Pending {
    /// Bytes of the current sequence already taken from earlier windows.
    fn count(&self) -> usize {
        match *self {
            Pending::Idle | Pending::HighHalf { .. } => 0,
            Pending::Collecting { have, .. } => usize::from(have),
            Pending::ByteOrderMark { .. } => 1,
            Pending::LowHalf { .. } => 2,
        }
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pending::Idle => f.write_str("Idle"),
            Pending::Collecting {
                bytes,
                have,
                expected,
            } => f
                .debug_struct("Collecting")
                .field("bytes", &BStr::new(&bytes[..usize::from(*have)]))
                .field("expected", expected)
                .finish(),
            Pending::ByteOrderMark { first } => f
                .debug_struct("ByteOrderMark")
                .field("first", &format_args!("{first:#04X}"))
                .finish(),
            Pending::LowHalf { tail, low, needs } => f
                .debug_struct("LowHalf")
                .field("tail", &BStr::new(tail))
                .field("low", &format_args!("{low:#06X}"))
                .field("needs", needs)
                .finish(),
            Pending::HighHalf { bits } => f
                .debug_struct("HighHalf")
                .field("bits", &format_args!("{bits:#08X}"))
                .finish(),
        }
    }
}

/// State threaded through repeated decode and encode calls of one stream.
///
/// # Examples
///
/// ```rust
/// use runecodec::{CodecError, Context};
///
/// let mut ctx = Context::new();
/// let step = ctx.decode::<u32>(&[0xCE, 0xBA]);
/// assert_eq!(step.result, Ok(Some(0x03BA)));
/// assert_eq!(step.consumed, 2);
///
/// let step = ctx.decode::<u32>(&[0xC0, 0xAF]);
/// assert_eq!(step.result, Err(CodecError::Overlong));
/// assert_eq!(step.consumed, 2);
/// assert!(ctx.has_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub(crate) pending: Pending,
    pub(crate) last_error: ErrorCode,
    pub(crate) byte_order: Option<ByteOrder>,
    pub(crate) options: CodecOptions,
}

impl Context {
    /// A fresh context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh context with the given options.
    #[must_use]
    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Forget everything except the options, as if freshly created.
    pub fn clear(&mut self) {
        *self = Self::with_options(self.options);
    }

    /// Options this context was created with.
    #[must_use]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Outcome of the most recent call.
    #[must_use]
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Whether the most recent call failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.last_error.is_error()
    }

    /// Number of bytes held over for the next call.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.count()
    }

    /// Whether nothing is held over.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending == Pending::Idle
    }

    /// Byte order announced by the last confirmed byte-order mark.
    #[must_use]
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    /// Whether a big-endian byte-order mark has been seen.
    #[must_use]
    pub fn is_big_endian(&self) -> bool {
        self.byte_order == Some(ByteOrder::Big)
    }

    /// Decode from `input`. See [`decode_rune`].
    pub fn decode<U: CodeUnit>(&mut self, input: &[u8]) -> Decoded<U> {
        decode_rune(self, input)
    }

    /// Encode `unit` into `out`. See [`encode_rune`].
    ///
    /// # Errors
    ///
    /// Whatever [`encode_rune`] reports.
    pub fn encode<U: CodeUnit>(
        &mut self,
        unit: U,
        out: &mut [u8; MAX_SEQUENCE_LEN],
    ) -> Result<usize, CodecError> {
        encode_rune(self, unit, out)
    }

    /// Whether collected bytes have to be swapped pairwise before use.
    pub(crate) fn swapped(&self) -> bool {
        self.byte_order
            .is_some_and(|order| order != self.options.native_order)
    }

    /// Record a clean finish.
    pub(crate) fn succeed(&mut self) {
        self.pending = Pending::Idle;
        self.last_error = ErrorCode::Success;
    }

    /// Record a failure and drop whatever was outstanding.
    pub(crate) fn fail(&mut self, error: CodecError) {
        self.pending = Pending::Idle;
        self.last_error = error.code();
    }

    /// Check the documented invariants; exposed for the fuzz harness.
    #[cfg(any(test, feature = "fuzzing"))]
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        assert!(self.pending_count() <= MAX_SEQUENCE_LEN);
        if let Pending::Collecting { have, expected, .. } = self.pending {
            assert!(have < expected, "collected {have} of {expected}");
            assert!(usize::from(expected) <= MAX_SEQUENCE_LEN);
        }
        if let Pending::LowHalf { needs, low, .. } = self.pending {
            assert!(needs <= 2);
            assert!(crate::is_low_surrogate(u32::from(low)));
        }
    }
}
