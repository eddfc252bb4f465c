//! A resumable UTF-8 codec with strict RFC 3629 checking.
//!
//! The core is a pair of state machines. [`decode_rune`] turns a window of
//! bytes into at most one value and always reports how many bytes it used;
//! [`encode_rune`] does the reverse. Whatever is left unfinished between
//! calls lives in a caller-owned [`Context`], so a stream can be decoded from
//! arbitrarily small pieces.
//!
//! Output storage is chosen by the [`CodeUnit`] type parameter. With `u32`
//! every scalar fits; with `u16` scalars above U+FFFF are split into a
//! UTF-16 surrogate pair over two calls, and the encoder joins them again.
//!
//! The decoder rejects every malformed class with a specific [`CodecError`]:
//! invalid lead bytes, truncation, overlong forms, surrogates,
//! noncharacters, and values beyond U+10FFFF.
//!
//! ```rust
//! use runecodec::{CodecOptions, StreamDecoder, to_runes};
//!
//! assert_eq!(to_runes(b"\xCE\xBA").unwrap(), [0x03BA]);
//!
//! let mut decoder = StreamDecoder::<u16>::new(CodecOptions::default());
//! decoder.feed(b"\xF0\x90");
//! assert_eq!(decoder.next(), None);
//! decoder.feed(b"\x80\x80");
//! let units: Vec<_> = decoder.finish().map(Result::unwrap).collect();
//! assert_eq!(units, [0xD800, 0xDC00]);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod context;
mod convert;
mod decode;
mod encode;
mod error;
mod length;
mod options;
mod rune;
mod stream;
mod validate;

#[cfg(test)]
mod tests;

pub use context::Context;
pub use convert::{
    encoded_len, from_runes, from_runes_bounded, from_runes_until_nul, from_utf16, is_full_rune,
    is_rune_start, is_valid_utf8, rune_count, to_runes, to_runes_bounded, to_runes_lossy,
    to_runes_until_nul, to_utf16,
};
pub use decode::{Decoded, decode_one, decode_rune};
pub use encode::{encode_one, encode_rune, flush_encoder};
pub use error::{CodecError, ErrorCode, MessageError, StreamError};
pub use length::{is_continuation, min_value, rune_len, sequence_len};
pub use options::{ByteOrder, CodecOptions, SurrogatePolicy, TruncationMode};
pub use rune::{
    CodeUnit, MAX_EXTENDED_RUNE, MAX_RUNE, MAX_SEQUENCE_LEN, MAX_UTF8_LEN, REPLACEMENT_RUNE, Rune,
};
pub use stream::{ClosedStreamDecoder, StreamDecoder};
pub use validate::{
    is_high_surrogate, is_low_surrogate, is_noncharacter, is_surrogate, is_valid_rune,
};
