/// Configuration for a [`Context`](crate::Context).
///
/// These options decide what a context does in the situations the byte-level
/// protocol leaves open: a sequence cut off by the end of the window, a
/// surrogate that has no partner, and byte-swapped word input.
///
/// # Examples
///
/// ```rust
/// use runecodec::{CodecOptions, Context, SurrogatePolicy, TruncationMode};
///
/// let mut ctx = Context::with_options(CodecOptions {
///     truncation: TruncationMode::Carry,
///     unpaired_surrogates: SurrogatePolicy::PassThrough,
///     ..Default::default()
/// });
/// # let _ = &mut ctx;
/// ```
///
/// # Default
///
/// Restart on truncation, reject unpaired surrogates, host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CodecOptions {
    /// What a context remembers when the window ends mid-sequence.
    ///
    /// # Default
    ///
    /// [`TruncationMode::Restart`]
    pub truncation: TruncationMode,

    /// How the encoder treats a surrogate that is not part of a pair.
    ///
    /// # Default
    ///
    /// [`SurrogatePolicy::Reject`]
    pub unpaired_surrogates: SurrogatePolicy,

    /// The byte order the decoder treats as unswapped.
    ///
    /// After a byte-order mark announces the other order, collected bytes are
    /// swapped pairwise before they are interpreted.
    ///
    /// # Default
    ///
    /// [`ByteOrder::NATIVE`]
    pub native_order: ByteOrder,
}

/// Truncation handling, see [`CodecOptions::truncation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum TruncationMode {
    /// Forget the partial sequence. The caller keeps the bytes and asks again
    /// from the same lead byte once more input is available.
    #[default]
    Restart,
    /// Keep the partial sequence in the context. The caller advances past the
    /// reported bytes and continues with whatever comes next.
    Carry,
}

/// Unpaired surrogate handling, see [`CodecOptions::unpaired_surrogates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SurrogatePolicy {
    /// Fail with [`CodecError::InvalidSequence`](crate::CodecError) and write
    /// nothing.
    #[default]
    Reject,
    /// Write the surrogate in its generalized three-byte form (`ED A0 80` to
    /// `ED BF BF`). The output is no longer strict UTF-8 and the strict
    /// decoder will refuse it.
    PassThrough,
}

/// Order of the two bytes in a 16-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ByteOrder {
    /// Most significant byte first, announced by `FE FF`.
    Big,
    /// Least significant byte first, announced by `FF FE`.
    Little,
}

impl ByteOrder {
    /// The byte order of the compilation target.
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    /// The order announced by a byte-order mark starting with `first`.
    pub(crate) const fn from_mark(first: u8) -> Option<ByteOrder> {
        match first {
            0xFE => Some(ByteOrder::Big),
            0xFF => Some(ByteOrder::Little),
            _ => None,
        }
    }

    /// The byte that must follow `first` to complete the mark.
    pub(crate) const fn partner(self) -> u8 {
        match self {
            ByteOrder::Big => 0xFF,
            ByteOrder::Little => 0xFE,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::NATIVE
    }
}
