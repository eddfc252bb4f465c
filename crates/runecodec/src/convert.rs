//! Whole-buffer conversions and byte-string helpers built on the state
//! machines.
//!
//! Every conversion comes in an explicit-bound form, which takes the slice
//! length as the bound, and a NUL-terminated form, which stops at the first
//! zero byte or zero rune. Strict conversions stop at the first malformed
//! sequence and say where it starts.

use alloc::vec::Vec;

use bstr::ByteSlice;

use crate::{
    CodeUnit,
    context::Context,
    decode::decode_rune,
    encode::{encode_rune, flush_encoder},
    error::StreamError,
    length::{is_continuation, rune_len, sequence_len},
    options::{CodecOptions, SurrogatePolicy},
    rune::{MAX_SEQUENCE_LEN, MAX_UTF8_LEN, REPLACEMENT_RUNE, Rune},
    validate::is_surrogate,
};

/// Decode up to `max` output values; returns them with the bytes consumed.
fn decode_prefix<U: CodeUnit>(bytes: &[u8], max: usize) -> Result<(Vec<U>, usize), StreamError> {
    let mut ctx = Context::new();
    let mut units = Vec::new();
    let mut pos = 0;

    while units.len() < max && (pos < bytes.len() || !ctx.is_idle()) {
        let step = decode_rune::<U>(&mut ctx, &bytes[pos..]);
        match step.result {
            Ok(Some(unit)) => units.push(unit),
            Ok(None) if step.consumed == 0 => break,
            Ok(None) => {}
            Err(error) => return Err(StreamError::new(error, pos)),
        }
        pos += step.consumed;
    }

    Ok((units, pos))
}

/// Decode all of `bytes`.
///
/// # Errors
///
/// The first malformed sequence, with the byte offset where it starts. A
/// sequence cut off by the end of `bytes` is [`Truncated`](crate::CodecError).
///
/// # Examples
///
/// ```rust
/// let runes = runecodec::to_runes("κόσμε".as_bytes()).unwrap();
/// assert_eq!(runes, [0x03BA, 0x1F79, 0x03C3, 0x03BC, 0x03B5]);
/// ```
pub fn to_runes(bytes: &[u8]) -> Result<Vec<Rune>, StreamError> {
    decode_prefix(bytes, usize::MAX).map(|(runes, _)| runes)
}

/// Decode `bytes` up to, not including, the first NUL byte.
///
/// # Errors
///
/// As [`to_runes`].
pub fn to_runes_until_nul(bytes: &[u8]) -> Result<Vec<Rune>, StreamError> {
    let end = bytes.find_byte(0).unwrap_or(bytes.len());
    to_runes(&bytes[..end])
}

/// Decode at most `max_runes` runes from the front of `bytes`.
///
/// Returns the runes and the number of bytes they took.
///
/// # Errors
///
/// As [`to_runes`], limited to the bytes actually examined.
pub fn to_runes_bounded(bytes: &[u8], max_runes: usize) -> Result<(Vec<Rune>, usize), StreamError> {
    decode_prefix(bytes, max_runes)
}

/// Decode all of `bytes` into UTF-16 code units.
///
/// # Errors
///
/// As [`to_runes`].
pub fn to_utf16(bytes: &[u8]) -> Result<Vec<u16>, StreamError> {
    decode_prefix(bytes, usize::MAX).map(|(units, _)| units)
}

/// Decode all of `bytes`, replacing each malformed sequence with U+FFFD.
///
/// Each error skips exactly the bytes the decoder reported, so one bad
/// sequence never swallows the good ones around it.
///
/// ```rust
/// let runes = runecodec::to_runes_lossy(b"a\xC0\xAFb\xE2\x82");
/// assert_eq!(runes, [0x61, 0xFFFD, 0x62, 0xFFFD]);
/// ```
#[must_use]
pub fn to_runes_lossy(bytes: &[u8]) -> Vec<Rune> {
    let mut ctx = Context::new();
    let mut runes = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let step = decode_rune::<Rune>(&mut ctx, &bytes[pos..]);
        match step.result {
            Ok(Some(rune)) => runes.push(rune),
            Ok(None) => {}
            Err(_) => runes.push(REPLACEMENT_RUNE),
        }
        if step.consumed == 0 {
            break;
        }
        pos += step.consumed;
    }

    runes
}

/// Encode all of `runes`.
///
/// # Errors
///
/// The first rune with no UTF-8 form, with its index as the offset.
///
/// ```rust
/// let bytes = runecodec::from_runes(&[0x03BA, 0x1F79]).unwrap();
/// assert_eq!(bytes, "κό".as_bytes());
/// ```
pub fn from_runes(runes: &[Rune]) -> Result<Vec<u8>, StreamError> {
    from_runes_bounded(runes, usize::MAX).map(|(bytes, _)| bytes)
}

/// Encode `runes` up to, not including, the first zero rune.
///
/// # Errors
///
/// As [`from_runes`].
pub fn from_runes_until_nul(runes: &[Rune]) -> Result<Vec<u8>, StreamError> {
    let end = runes.iter().position(|&r| r == 0).unwrap_or(runes.len());
    from_runes(&runes[..end])
}

/// Encode as many whole runes as fit into `max_bytes`.
///
/// A sequence is never split: the rune that would overflow the bound is left
/// for the caller. Returns the bytes and the number of runes they hold.
///
/// # Errors
///
/// As [`from_runes`], limited to the runes that fit.
pub fn from_runes_bounded(runes: &[Rune], max_bytes: usize) -> Result<(Vec<u8>, usize), StreamError> {
    let mut ctx = Context::new();
    let mut bytes = Vec::new();
    let mut out = [0; MAX_SEQUENCE_LEN];

    for (index, &rune) in runes.iter().enumerate() {
        // Runes with no UTF-8 form take no room, so the encoder reports them.
        let len = encoded_len(&[rune]).unwrap_or(0);
        if bytes.len() + len > max_bytes {
            return Ok((bytes, index));
        }
        let written =
            encode_rune(&mut ctx, rune, &mut out).map_err(|error| StreamError::new(error, index))?;
        bytes.extend_from_slice(&out[..written]);
    }

    Ok((bytes, runes.len()))
}

/// Encode UTF-16 code units, joining surrogate pairs.
///
/// `policy` decides what happens to a surrogate without a partner, including
/// a high surrogate at the very end.
///
/// # Errors
///
/// Under [`SurrogatePolicy::Reject`], the first unpaired surrogate, with the
/// index of that surrogate as the offset.
///
/// ```rust
/// use runecodec::{SurrogatePolicy, from_utf16};
///
/// let units = [0x0041, 0xD83D, 0xDE00];
/// let bytes = from_utf16(&units, SurrogatePolicy::Reject).unwrap();
/// assert_eq!(bytes, "A\u{1F600}".as_bytes());
///
/// let lone = from_utf16(&[0xD83D], SurrogatePolicy::PassThrough).unwrap();
/// assert_eq!(lone, [0xED, 0xA0, 0xBD]);
/// ```
pub fn from_utf16(units: &[u16], policy: SurrogatePolicy) -> Result<Vec<u8>, StreamError> {
    let mut ctx = Context::with_options(CodecOptions {
        unpaired_surrogates: policy,
        ..CodecOptions::default()
    });
    let mut bytes = Vec::with_capacity(units.len());
    let mut out = [0; MAX_SEQUENCE_LEN];
    let mut high_at = 0;

    for (index, &unit) in units.iter().enumerate() {
        let holding = !ctx.is_idle();
        let written = encode_rune(&mut ctx, unit, &mut out).map_err(|error| {
            StreamError::new(error, if holding { high_at } else { index })
        })?;
        bytes.extend_from_slice(&out[..written]);
        if !ctx.is_idle() {
            high_at = index;
        }
    }

    let written = flush_encoder(&mut ctx, &mut out)
        .map_err(|error| StreamError::new(error, high_at))?;
    bytes.extend_from_slice(&out[..written]);

    Ok(bytes)
}

/// Whether `byte` can start a sequence, i.e. is not a continuation byte.
#[inline]
#[must_use]
pub const fn is_rune_start(byte: u8) -> bool {
    !is_continuation(byte)
}

/// Whether `bytes` is long enough to decode its first sequence.
///
/// A lead byte that announces no length is decided by itself, so it counts
/// as full.
///
/// ```rust
/// assert!(runecodec::is_full_rune(&[0xE2, 0x82, 0xAC]));
/// assert!(!runecodec::is_full_rune(&[0xE2, 0x82]));
/// assert!(!runecodec::is_full_rune(&[]));
/// ```
#[must_use]
pub fn is_full_rune(bytes: &[u8]) -> bool {
    let Some(&lead) = bytes.first() else {
        return false;
    };
    match sequence_len(lead) {
        Some(len) => bytes.len() >= len,
        None => true,
    }
}

/// Number of runes in `bytes`, counting every malformed sequence as one.
#[must_use]
pub fn rune_count(bytes: &[u8]) -> usize {
    to_runes_lossy(bytes).len()
}

/// Whether `bytes` is strict UTF-8 with nothing the decoder would reject.
///
/// Byte-order marks are not UTF-8 and make this false.
#[must_use]
pub fn is_valid_utf8(bytes: &[u8]) -> bool {
    let mut ctx = Context::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let step = decode_rune::<Rune>(&mut ctx, &bytes[pos..]);
        if step.value().is_none() {
            return false;
        }
        pos += step.consumed;
    }
    true
}

/// Bytes needed to encode all of `runes`, or `None` if any has no UTF-8 form.
#[must_use]
pub fn encoded_len(runes: &[Rune]) -> Option<usize> {
    runes.iter().try_fold(0_usize, |total, &rune| {
        if is_surrogate(rune) {
            return None;
        }
        match rune_len(rune)? {
            len @ 1..=MAX_UTF8_LEN => Some(total + len),
            _ => None,
        }
    })
}
