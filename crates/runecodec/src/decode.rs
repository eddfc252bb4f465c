//! The decoder state machine.
//!
//! One call looks at a window of bytes and produces at most one output value.
//! It always says how many bytes of the window it used, so a caller can move
//! its cursor forward even when the call failed:
//!
//! - `Ok(Some(unit))`: a value was decoded from `consumed` bytes.
//! - `Ok(None)`: bytes were used without producing a value (a byte-order mark),
//!   or the window was empty.
//! - `Err(Truncated)`: the window ended mid-sequence, a byte-order mark
//!   included. Under [`TruncationMode::Restart`](crate::TruncationMode) the
//!   context is left idle and the caller asks again from the same position
//!   with a longer window; under `Carry` it skips `consumed` bytes and the
//!   context holds on to them. A pending low surrogate half is the one
//!   exception: it is held in both modes and reports `consumed = 0`.
//! - An empty window returns `Ok(None)` with `consumed = 0` and leaves the
//!   context untouched, whatever it holds.
//! - Any other error: skip `consumed` bytes (never zero) and carry on.
//!
//! Bytes are collected one at a time and the collected prefix is re-examined
//! after each, so an error is reported as soon as the offending byte is seen
//! and never later.

use crate::{
    CodeUnit,
    context::{Context, Pending},
    error::{CodecError, ErrorCode},
    length::{is_continuation, lead_payload, min_partial, sequence_len},
    options::{ByteOrder, TruncationMode},
    rune::{MAX_RUNE, MAX_SEQUENCE_LEN, Rune},
    validate::is_valid_rune,
};

/// Result of one decoder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Decoded<U> {
    /// Bytes of the window this call used.
    pub consumed: usize,
    /// The decoded value, if any, or why there is none.
    pub result: Result<Option<U>, CodecError>,
}

impl<U: Copy> Decoded<U> {
    const fn nothing(consumed: usize) -> Self {
        Self {
            consumed,
            result: Ok(None),
        }
    }

    const fn unit(unit: U, consumed: usize) -> Self {
        Self {
            consumed,
            result: Ok(Some(unit)),
        }
    }

    const fn failed(error: CodecError, consumed: usize) -> Self {
        Self {
            consumed,
            result: Err(error),
        }
    }

    /// The decoded value, if this call produced one.
    #[must_use]
    pub fn value(&self) -> Option<U> {
        self.result.ok().flatten()
    }

    /// The error, if this call failed.
    #[must_use]
    pub fn error(&self) -> Option<CodecError> {
        self.result.err()
    }
}

/// Decode at most one value from `input`, resuming whatever `ctx` holds.
///
/// The length of `input` is the window: the decoder never looks past it.
/// With `U = u16`, scalars above U+FFFF come out as a high surrogate
/// (`consumed` covers the first two bytes) followed, on the next call, by the
/// low surrogate (`consumed` covers the last two).
///
/// # Examples
///
/// ```rust
/// use runecodec::{CodecError, Context, decode_rune};
///
/// let mut ctx = Context::new();
/// let step = decode_rune::<u32>(&mut ctx, &[0xE0, 0xA0, 0x80]);
/// assert_eq!((step.result, step.consumed), (Ok(Some(0x0800)), 3));
///
/// let step = decode_rune::<u32>(&mut ctx, &[0xC2]);
/// assert_eq!((step.result, step.consumed), (Err(CodecError::Truncated), 1));
///
/// let mut narrow = Context::new();
/// let input = [0xF0, 0x90, 0x80, 0x80];
/// let high = decode_rune::<u16>(&mut narrow, &input);
/// assert_eq!((high.result, high.consumed), (Ok(Some(0xD800)), 2));
/// let low = decode_rune::<u16>(&mut narrow, &input[2..]);
/// assert_eq!((low.result, low.consumed), (Ok(Some(0xDC00)), 2));
/// ```
pub fn decode_rune<U: CodeUnit>(ctx: &mut Context, input: &[u8]) -> Decoded<U> {
    if input.is_empty() {
        return Decoded::nothing(0);
    }
    match ctx.pending {
        Pending::LowHalf { tail, low, needs } => resume_low_half(ctx, input, tail, low, needs),
        Pending::ByteOrderMark { first } => resume_byte_order_mark(ctx, input, first),
        Pending::Collecting { bytes, have, .. } => {
            let seq = Sequence {
                bytes,
                have: usize::from(have),
            };
            collect(ctx, seq, input, 0)
        }
        Pending::Idle | Pending::HighHalf { .. } => start(ctx, input),
    }
}

/// Decode one value with a throwaway context.
///
/// A partial sequence left at the end of `input` is reported as
/// [`CodecError::Truncated`] and nothing is remembered.
pub fn decode_one(input: &[u8]) -> Decoded<Rune> {
    decode_rune(&mut Context::new(), input)
}

/// Raw bytes of the sequence under construction.
#[derive(Debug, Clone, Copy)]
struct Sequence {
    bytes: [u8; MAX_SEQUENCE_LEN],
    have: usize,
}

enum Scan {
    NeedMore { expected: usize },
    Complete { value: Rune },
    Invalid(CodecError),
}

impl Sequence {
    fn new(lead: u8) -> Self {
        let mut bytes = [0; MAX_SEQUENCE_LEN];
        bytes[0] = lead;
        Self { bytes, have: 1 }
    }

    fn push(&mut self, byte: u8) {
        self.bytes[self.have] = byte;
        self.have += 1;
    }

    fn scan(&self, swapped: bool) -> Scan {
        if !swapped {
            return scan_logical(&self.bytes[..self.have]);
        }

        // Swapped input arrives in 16-bit words; only whole words are looked
        // at, and the lead is the second byte of the first word.
        if self.have < 2 {
            return Scan::NeedMore { expected: 2 };
        }
        let words = self.have & !1;
        let mut logical = [0; MAX_SEQUENCE_LEN];
        for (dst, src) in logical
            .chunks_exact_mut(2)
            .zip(self.bytes[..words].chunks_exact(2))
        {
            dst[0] = src[1];
            dst[1] = src[0];
        }

        let lead = logical[0];
        if is_continuation(lead) {
            return Scan::Invalid(CodecError::InvalidStart);
        }
        match sequence_len(lead) {
            None => Scan::Invalid(CodecError::InvalidValue),
            Some(len) if len % 2 == 1 => Scan::Invalid(CodecError::InvalidSequence),
            Some(_) => scan_logical(&logical[..words]),
        }
    }
}

/// Examine a collected prefix whose first byte is a lead byte.
fn scan_logical(seq: &[u8]) -> Scan {
    let lead = seq[0];
    let Some(len) = sequence_len(lead) else {
        return Scan::Invalid(CodecError::InvalidValue);
    };

    let mut value = lead_payload(lead, len);
    for (index, &byte) in seq.iter().enumerate().take(len).skip(1) {
        if !is_continuation(byte) {
            return Scan::Invalid(CodecError::InvalidSequence);
        }
        value = (value << 6) | Rune::from(byte & 0x3F);
        if index == 1 && value < min_partial(len) {
            return Scan::Invalid(CodecError::Overlong);
        }
    }

    if seq.len() < len {
        return Scan::NeedMore { expected: len };
    }
    if value > MAX_RUNE {
        return Scan::Invalid(CodecError::ValueOutOfRange);
    }
    if !is_valid_rune(value) {
        return Scan::Invalid(CodecError::InvalidSequence);
    }
    Scan::Complete { value }
}

fn start<U: CodeUnit>(ctx: &mut Context, input: &[u8]) -> Decoded<U> {
    let lead = input[0];

    if let Some(order) = ByteOrder::from_mark(lead) {
        return match input.get(1) {
            Some(&next) => finish_byte_order_mark(ctx, order, next, 2),
            None => {
                match ctx.options.truncation {
                    TruncationMode::Restart => ctx.fail(CodecError::Truncated),
                    TruncationMode::Carry => {
                        ctx.pending = Pending::ByteOrderMark { first: lead };
                        ctx.last_error = ErrorCode::Truncated;
                    }
                }
                Decoded::failed(CodecError::Truncated, 1)
            }
        };
    }

    if ctx.swapped() {
        return collect(ctx, Sequence::new(lead), input, 1);
    }

    if lead.is_ascii() {
        ctx.succeed();
        return Decoded::unit(U::from_rune(Rune::from(lead)), 1);
    }
    if is_continuation(lead) {
        return reject(ctx, CodecError::InvalidStart, 1, lead);
    }
    if sequence_len(lead).is_none() {
        return reject(ctx, CodecError::InvalidValue, 1, lead);
    }

    collect(ctx, Sequence::new(lead), input, 1)
}

/// Pull bytes from `input` into `seq` until it completes or fails. `taken`
/// counts the bytes of `input` already in `seq`.
fn collect<U: CodeUnit>(
    ctx: &mut Context,
    mut seq: Sequence,
    input: &[u8],
    mut taken: usize,
) -> Decoded<U> {
    let swapped = ctx.swapped();
    loop {
        match seq.scan(swapped) {
            Scan::NeedMore { expected } => {
                let Some(&byte) = input.get(taken) else {
                    return truncated(ctx, seq, expected, taken);
                };
                seq.push(byte);
                taken += 1;
            }
            Scan::Complete { value } => return complete(ctx, &seq, value, taken),
            Scan::Invalid(error) => return reject(ctx, error, taken, seq.bytes[0]),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncated<U: CodeUnit>(
    ctx: &mut Context,
    seq: Sequence,
    expected: usize,
    taken: usize,
) -> Decoded<U> {
    match ctx.options.truncation {
        TruncationMode::Restart => ctx.fail(CodecError::Truncated),
        TruncationMode::Carry => {
            ctx.pending = Pending::Collecting {
                bytes: seq.bytes,
                have: seq.have as u8,
                expected: expected as u8,
            };
            ctx.last_error = ErrorCode::Truncated;
        }
    }
    Decoded::failed(CodecError::Truncated, taken)
}

#[allow(clippy::cast_possible_truncation)]
fn complete<U: CodeUnit>(
    ctx: &mut Context,
    seq: &Sequence,
    value: Rune,
    taken: usize,
) -> Decoded<U> {
    if U::WIDE || value <= 0xFFFF {
        ctx.succeed();
        return Decoded::unit(U::from_rune(value), taken);
    }

    // Only 4-byte sequences reach here. The high half goes out now; the last
    // two bytes stay with the caller and are handed over again next call.
    let offset = value - 0x1_0000;
    let high = 0xD800 | (offset >> 10);
    let low = 0xDC00 | (offset & 0x3FF);
    let needs = taken.min(2);

    ctx.pending = Pending::LowHalf {
        tail: [seq.bytes[2], seq.bytes[3]],
        low: low as u16,
        needs: needs as u8,
    };
    ctx.last_error = ErrorCode::Success;
    Decoded::unit(U::from_rune(high), taken - needs)
}

fn resume_low_half<U: CodeUnit>(
    ctx: &mut Context,
    input: &[u8],
    tail: [u8; 2],
    low: u16,
    needs: u8,
) -> Decoded<U> {
    let needs = usize::from(needs);
    let Some(window) = input.get(..needs) else {
        ctx.last_error = ErrorCode::Truncated;
        return Decoded::failed(CodecError::Truncated, 0);
    };

    if window != &tail[2 - needs..] {
        return reject(ctx, CodecError::InvalidSequence, needs, tail[0]);
    }

    ctx.succeed();
    Decoded::unit(U::from_rune(Rune::from(low)), needs)
}

fn resume_byte_order_mark<U: CodeUnit>(ctx: &mut Context, input: &[u8], first: u8) -> Decoded<U> {
    match ByteOrder::from_mark(first) {
        Some(order) => finish_byte_order_mark(ctx, order, input[0], 1),
        None => reject(ctx, CodecError::InvalidStart, 1, first),
    }
}

fn finish_byte_order_mark<U: CodeUnit>(
    ctx: &mut Context,
    order: ByteOrder,
    next: u8,
    consumed: usize,
) -> Decoded<U> {
    if next != order.partner() {
        return reject(ctx, CodecError::InvalidStart, consumed, next);
    }

    tracing::debug!(?order, "byte-order mark");
    ctx.byte_order = Some(order);
    ctx.succeed();
    Decoded::nothing(consumed)
}

fn reject<U: CodeUnit>(
    ctx: &mut Context,
    error: CodecError,
    consumed: usize,
    byte: u8,
) -> Decoded<U> {
    tracing::trace!(%error, consumed, byte, "malformed sequence");
    ctx.fail(error);
    Decoded::failed(error, consumed)
}
