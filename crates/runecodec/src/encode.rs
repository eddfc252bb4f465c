//! The encoder state machine, the mirror of [`crate::decode`].
//!
//! With 16-bit storage the encoder sees UTF-16 code units. A high surrogate
//! is held in the context and written out together with the low surrogate
//! that follows it, as one 4-byte sequence.

use crate::{
    CodeUnit,
    context::{Context, Pending},
    error::{CodecError, ErrorCode},
    length::rune_len,
    options::SurrogatePolicy,
    rune::{MAX_SEQUENCE_LEN, MAX_UTF8_LEN, Rune},
    validate::{is_high_surrogate, is_low_surrogate, is_surrogate},
};

/// Encode one value into `out` and return how many bytes were written.
///
/// Writing zero bytes with `Ok` means a high surrogate is now held in `ctx`.
/// With [`SurrogatePolicy::PassThrough`] an abandoned high surrogate and the
/// current unit can both be written by one call, which is why `out` has room
/// for six bytes.
///
/// # Errors
///
/// [`CodecError::InvalidSequence`] for a value outside U+0000..=U+10FFFF, and
/// for an unpaired surrogate under [`SurrogatePolicy::Reject`]. A wide unit
/// arriving while a high surrogate from narrow input is held also fails, and
/// the held half is dropped. Nothing is written in any of these cases. When
/// the failure came from an abandoned high surrogate, `unit` itself was not
/// consumed and may be submitted again.
///
/// # Examples
///
/// ```rust
/// use runecodec::{Context, encode_rune};
///
/// let mut out = [0; 6];
/// let mut ctx = Context::new();
/// assert_eq!(encode_rune(&mut ctx, 0x03BA_u32, &mut out), Ok(2));
/// assert_eq!(&out[..2], &[0xCE, 0xBA]);
///
/// assert_eq!(encode_rune(&mut ctx, 0xD83D_u16, &mut out), Ok(0));
/// assert_eq!(encode_rune(&mut ctx, 0xDE00_u16, &mut out), Ok(4));
/// assert_eq!(&out[..4], "\u{1F600}".as_bytes());
/// ```
pub fn encode_rune<U: CodeUnit>(
    ctx: &mut Context,
    unit: U,
    out: &mut [u8; MAX_SEQUENCE_LEN],
) -> Result<usize, CodecError> {
    let value = unit.to_rune();
    let mut written = 0;

    if let Pending::HighHalf { bits } = ctx.pending {
        ctx.pending = Pending::Idle;
        if U::WIDE {
            // Only narrow input holds a high half; the two do not mix.
            tracing::trace!(value, "wide unit after a held high surrogate");
            ctx.fail(CodecError::InvalidSequence);
            return Err(CodecError::InvalidSequence);
        }
        if is_low_surrogate(value) {
            write_sequence(bits | (value & 0x3FF), 4, out);
            ctx.succeed();
            return Ok(4);
        }
        written = unpaired(ctx, abandoned_high(bits), out)?;
    }

    if !U::WIDE && is_high_surrogate(value) {
        ctx.pending = Pending::HighHalf {
            bits: ((value & 0x3FF) << 10) + 0x1_0000,
        };
        ctx.last_error = ErrorCode::Success;
        return Ok(written);
    }

    if is_surrogate(value) {
        return unpaired(ctx, value, &mut out[written..]).map(|n| written + n);
    }

    match rune_len(value) {
        Some(len @ 1..=MAX_UTF8_LEN) => {
            write_sequence(value, len, &mut out[written..]);
            ctx.succeed();
            Ok(written + len)
        }
        _ => {
            tracing::trace!(value, "value has no UTF-8 form");
            ctx.fail(CodecError::InvalidSequence);
            Err(CodecError::InvalidSequence)
        }
    }
}

/// Encode one scalar with a throwaway context.
///
/// # Errors
///
/// As [`encode_rune`]. Surrogates are always rejected.
pub fn encode_one(rune: Rune, out: &mut [u8; MAX_SEQUENCE_LEN]) -> Result<usize, CodecError> {
    encode_rune(&mut Context::new(), rune, out)
}

/// Settle a high surrogate still held when the input ends.
///
/// Returns `Ok(0)` when nothing is held.
///
/// # Errors
///
/// [`CodecError::InvalidSequence`] under [`SurrogatePolicy::Reject`].
pub fn flush_encoder(
    ctx: &mut Context,
    out: &mut [u8; MAX_SEQUENCE_LEN],
) -> Result<usize, CodecError> {
    let Pending::HighHalf { bits } = ctx.pending else {
        return Ok(0);
    };
    ctx.pending = Pending::Idle;
    unpaired(ctx, abandoned_high(bits), out)
}

/// The high surrogate that announced `bits`.
const fn abandoned_high(bits: u32) -> Rune {
    0xD800 | ((bits - 0x1_0000) >> 10)
}

fn unpaired(ctx: &mut Context, surrogate: Rune, out: &mut [u8]) -> Result<usize, CodecError> {
    match ctx.options.unpaired_surrogates {
        SurrogatePolicy::Reject => {
            tracing::trace!(surrogate, "unpaired surrogate");
            ctx.fail(CodecError::InvalidSequence);
            Err(CodecError::InvalidSequence)
        }
        SurrogatePolicy::PassThrough => {
            write_sequence(surrogate, 3, out);
            ctx.succeed();
            Ok(3)
        }
    }
}

/// Write `value` as a `len`-byte sequence at the front of `out`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_sequence(mut value: Rune, len: usize, out: &mut [u8]) {
    if len == 1 {
        out[0] = value as u8;
        return;
    }
    for byte in out[1..len].iter_mut().rev() {
        *byte = 0x80 | (value & 0x3F) as u8;
        value >>= 6;
    }
    out[0] = ((0xFF_u32 << (8 - len)) & 0xFF) as u8 | value as u8;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::CodecOptions;

    #[rstest]
    #[case(0x00, &[0x00])]
    #[case(0x7F, &[0x7F])]
    #[case(0x80, &[0xC2, 0x80])]
    #[case(0x03BA, &[0xCE, 0xBA])]
    #[case(0x07FF, &[0xDF, 0xBF])]
    #[case(0x0800, &[0xE0, 0xA0, 0x80])]
    #[case(0xFFFD, &[0xEF, 0xBF, 0xBD])]
    #[case(0x1_0000, &[0xF0, 0x90, 0x80, 0x80])]
    #[case(0x10_FFFD, &[0xF4, 0x8F, 0xBF, 0xBD])]
    fn encodes_scalars(#[case] rune: Rune, #[case] expected: &[u8]) {
        let mut out = [0; MAX_SEQUENCE_LEN];
        assert_eq!(encode_one(rune, &mut out), Ok(expected.len()));
        assert_eq!(&out[..expected.len()], expected);
    }

    #[test]
    fn noncharacters_are_encoded() {
        let mut out = [0; MAX_SEQUENCE_LEN];
        assert_eq!(encode_one(0xFFFF, &mut out), Ok(3));
        assert_eq!(&out[..3], &[0xEF, 0xBF, 0xBF]);
    }

    #[rstest]
    #[case(0x11_0000)]
    #[case(0x20_0000)]
    #[case(0x7FFF_FFFF)]
    #[case(0xFFFF_FFFF)]
    fn out_of_range_writes_nothing(#[case] rune: Rune) {
        let mut ctx = Context::new();
        let mut out = [0xAA; MAX_SEQUENCE_LEN];
        assert_eq!(
            encode_rune(&mut ctx, rune, &mut out),
            Err(CodecError::InvalidSequence)
        );
        assert_eq!(out, [0xAA; MAX_SEQUENCE_LEN]);
        assert_eq!(ctx.last_error(), ErrorCode::InvalidSequence);
    }

    #[test]
    fn wide_surrogates_follow_policy() {
        let mut out = [0; MAX_SEQUENCE_LEN];
        let mut strict = Context::new();
        assert_eq!(
            encode_rune(&mut strict, 0xD800_u32, &mut out),
            Err(CodecError::InvalidSequence)
        );
        assert!(strict.is_idle());

        let mut lenient = Context::with_options(CodecOptions {
            unpaired_surrogates: SurrogatePolicy::PassThrough,
            ..CodecOptions::default()
        });
        assert_eq!(encode_rune(&mut lenient, 0xD800_u32, &mut out), Ok(3));
        assert_eq!(&out[..3], &[0xED, 0xA0, 0x80]);
        assert_eq!(encode_rune(&mut lenient, 0xDFFF_u32, &mut out), Ok(3));
        assert_eq!(&out[..3], &[0xED, 0xBF, 0xBF]);
    }

    #[test]
    fn flush_settles_held_high() {
        let mut out = [0; MAX_SEQUENCE_LEN];
        let mut ctx = Context::new();
        assert_eq!(flush_encoder(&mut ctx, &mut out), Ok(0));
        assert_eq!(encode_rune(&mut ctx, 0xDBFF_u16, &mut out), Ok(0));
        assert_eq!(ctx.pending_count(), 0);
        assert!(!ctx.is_idle());
        assert_eq!(
            flush_encoder(&mut ctx, &mut out),
            Err(CodecError::InvalidSequence)
        );
        assert!(ctx.is_idle());
    }

    #[test]
    fn success_clears_last_error() {
        let mut ctx = Context::new();
        let mut out = [0; MAX_SEQUENCE_LEN];
        let _ = encode_rune(&mut ctx, 0x11_0000_u32, &mut out);
        assert!(ctx.has_error());
        assert_eq!(encode_rune(&mut ctx, u32::from('a'), &mut out), Ok(1));
        assert!(!ctx.has_error());
    }
}
