//! Incremental decoding of a byte stream that arrives in arbitrary chunks.
//!
//! [`StreamDecoder`] owns a [`Context`] and a buffer of the bytes it has been
//! fed but not yet decoded. A sequence cut off at the end of a chunk stays in
//! the buffer and is decoded from its lead byte once the rest arrives, so the
//! items produced never depend on how the input was split.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::{
    CodeUnit,
    context::Context,
    decode::decode_rune,
    error::{CodecError, StreamError},
    options::{CodecOptions, TruncationMode},
    rune::Rune,
};

/// Decoded bytes are dropped from the front of the buffer once at least this
/// many have piled up and they make up half of it.
const COMPACT_THRESHOLD: usize = 4096;

/// A decoder fed with successive chunks of one byte stream.
///
/// Iterating yields every value that can be completed with the bytes fed so
/// far, then returns `None` until more input arrives. Malformed sequences are
/// reported in place and decoding carries on after them.
///
/// # Examples
///
/// ```rust
/// use runecodec::{CodecOptions, StreamDecoder};
///
/// let mut decoder = StreamDecoder::<u32>::new(CodecOptions::default());
/// decoder.feed(&[0x61, 0xE2, 0x82]);
/// let first: Vec<_> = decoder.by_ref().collect();
/// assert_eq!(first, [Ok(0x61)]);
///
/// decoder.feed(&[0xAC]);
/// let rest: Vec<_> = decoder.finish().collect();
/// assert_eq!(rest, [Ok(0x20AC)]);
/// ```
#[derive(Debug, Clone)]
pub struct StreamDecoder<U: CodeUnit = Rune> {
    ctx: Context,
    buffer: Vec<u8>,
    /// Index of the first undecoded byte in `buffer`.
    pos: usize,
    /// Stream offset of `buffer[0]`.
    base: usize,
    closed: bool,
    _unit: PhantomData<U>,
}

impl<U: CodeUnit> StreamDecoder<U> {
    /// Create a decoder.
    ///
    /// The decoder keeps its own buffer, so it always restarts truncated
    /// sequences; [`CodecOptions::truncation`] is ignored.
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        Self {
            ctx: Context::with_options(CodecOptions {
                truncation: TruncationMode::Restart,
                ..options
            }),
            buffer: Vec::new(),
            pos: 0,
            base: 0,
            closed: false,
            _unit: PhantomData,
        }
    }

    /// Append the next chunk of the stream.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.pos >= COMPACT_THRESHOLD && self.pos * 2 >= self.buffer.len() {
            self.buffer.drain(..self.pos);
            self.base += self.pos;
            self.pos = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Close the stream; the returned iterator drains what is left.
    #[must_use]
    pub fn finish(mut self) -> ClosedStreamDecoder<U> {
        self.closed = true;
        ClosedStreamDecoder { decoder: self }
    }

    /// Stream offset of the first byte not yet decoded.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// The decoder's context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    fn next_unit(&mut self) -> Option<Result<U, StreamError>> {
        loop {
            let start = self.offset() - self.ctx.pending_count();
            let window = &self.buffer[self.pos..];

            if window.is_empty() && self.ctx.pending_count() == 0 {
                return None;
            }

            let step = decode_rune::<U>(&mut self.ctx, window);
            match step.result {
                Ok(Some(unit)) => {
                    self.pos += step.consumed;
                    return Some(Ok(unit));
                }
                Ok(None) if step.consumed > 0 => self.pos += step.consumed,
                Ok(None) => {
                    // A low half waiting for bytes that will never come.
                    if !self.closed {
                        return None;
                    }
                    self.ctx.clear();
                    return Some(Err(StreamError::new(CodecError::Truncated, start)));
                }
                // Restarted sequences and marks stay in the buffer until the
                // rest of them arrives.
                Err(CodecError::Truncated) if !self.closed => return None,
                Err(error) => {
                    self.pos += step.consumed;
                    if error.is_truncated() {
                        self.pos = self.buffer.len();
                        self.ctx.clear();
                    }
                    return Some(Err(StreamError::new(error, start)));
                }
            }
        }
    }
}

impl<U: CodeUnit> Default for StreamDecoder<U> {
    fn default() -> Self {
        Self::new(CodecOptions::default())
    }
}

impl<U: CodeUnit> Iterator for StreamDecoder<U> {
    type Item = Result<U, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_unit()
    }
}

/// A [`StreamDecoder`] that has been closed to further input.
///
/// Returned by [`StreamDecoder::finish`]. It yields what is left in the
/// buffer; a sequence still incomplete at the end is reported once as
/// [`CodecError::Truncated`].
#[derive(Debug, Clone)]
pub struct ClosedStreamDecoder<U: CodeUnit = Rune> {
    decoder: StreamDecoder<U>,
}

impl<U: CodeUnit> Iterator for ClosedStreamDecoder<U> {
    type Item = Result<U, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_unit()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;

    fn drain<U: CodeUnit>(chunks: &[&[u8]]) -> Vec<Result<U, StreamError>> {
        let mut decoder = StreamDecoder::<U>::default();
        let mut items = Vec::new();
        for chunk in chunks {
            decoder.feed(chunk);
            items.extend(decoder.by_ref());
        }
        items.extend(decoder.finish());
        items
    }

    #[test]
    fn split_sequence_waits_for_rest() {
        let mut decoder = StreamDecoder::<u32>::default();
        decoder.feed(&[0xF0, 0x90]);
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.offset(), 0);
        decoder.feed(&[0x80]);
        assert_eq!(decoder.next(), None);
        decoder.feed(&[0x80, 0x41]);
        assert_eq!(decoder.next(), Some(Ok(0x1_0000)));
        assert_eq!(decoder.next(), Some(Ok(0x41)));
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.offset(), 5);
    }

    #[test]
    fn dangling_tail_reported_once() {
        assert_eq!(
            drain::<u32>(&[b"ab", b"\xE2\x82"]),
            vec![
                Ok(0x61),
                Ok(0x62),
                Err(StreamError::new(CodecError::Truncated, 2))
            ]
        );
    }

    #[test]
    fn errors_do_not_stop_decoding() {
        assert_eq!(
            drain::<u32>(&[b"\x80a\xC0", b"\xAFb"]),
            vec![
                Err(StreamError::new(CodecError::InvalidStart, 0)),
                Ok(0x61),
                Err(StreamError::new(CodecError::Overlong, 2)),
                Ok(0x62),
            ]
        );
    }

    #[test]
    fn byte_order_mark_across_chunks() {
        assert_eq!(drain::<u32>(&[b"\xFE", b"\xFF"]), vec![]);
        assert_eq!(
            drain::<u32>(&[b"a\xFE", b"a"]),
            vec![Ok(0x61), Err(StreamError::new(CodecError::InvalidStart, 1))]
        );
        assert_eq!(
            drain::<u32>(&[b"a\xFF"]),
            vec![Ok(0x61), Err(StreamError::new(CodecError::Truncated, 1))]
        );
    }

    #[test]
    fn narrow_units_split_pairs() {
        assert_eq!(
            drain::<u16>(&[b"\xF0\x9F", b"\x98\x80!"]),
            vec![Ok(0xD83D), Ok(0xDE00), Ok(0x21)]
        );
    }

    #[test]
    fn compaction_keeps_offsets() {
        let mut decoder = StreamDecoder::<u32>::default();
        let chunk = [b'x'; 1000];
        for _ in 0..10 {
            decoder.feed(&chunk);
            assert_eq!(decoder.by_ref().count(), 1000);
        }
        decoder.feed(b"\x80");
        assert_eq!(
            decoder.next(),
            Some(Err(StreamError::new(CodecError::InvalidStart, 10_000)))
        );
        assert!(decoder.buffer.len() < 10_001);
    }
}
