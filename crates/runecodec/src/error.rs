//! Error reporting.
//!
//! Every decode and encode call reports a [`CodecError`] explicitly and, in
//! parallel, records the matching [`ErrorCode`] in its
//! [`Context`](crate::Context). Codes carry stable small integers and stable
//! messages so they can cross an FFI or logging boundary unchanged.

use alloc::{format, string::String};
use core::fmt;

use thiserror::Error;

/// A malformed or unrepresentable sequence.
///
/// Apart from [`CodecError::Truncated`], which asks for more input, every
/// variant means "skip the reported number of bytes and carry on".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum CodecError {
    /// A continuation byte (or a broken byte-order mark) where a sequence
    /// should start.
    #[error("Invalid start byte")]
    InvalidStart,
    /// The input ended before the sequence did.
    #[error("Truncated sequence")]
    Truncated,
    /// A lead byte that announces no usable length.
    #[error("Invalid encoded UTF value")]
    InvalidValue,
    /// A sequence longer than the value needs.
    #[error("Overlong byte sequence")]
    Overlong,
    /// A bad continuation byte, or a well-formed sequence carrying an illegal
    /// value (surrogate, noncharacter).
    #[error("Invalid byte sequence")]
    InvalidSequence,
    /// A sequence whose value exceeds U+10FFFF.
    #[error("Decoded rune exceeds UTF value limit")]
    ValueOutOfRange,
}

impl CodecError {
    /// Stable numeric code.
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            CodecError::InvalidStart => ErrorCode::InvalidStart,
            CodecError::Truncated => ErrorCode::Truncated,
            CodecError::InvalidValue => ErrorCode::InvalidValue,
            CodecError::Overlong => ErrorCode::Overlong,
            CodecError::InvalidSequence => ErrorCode::InvalidSequence,
            CodecError::ValueOutOfRange => ErrorCode::ValueOutOfRange,
        }
    }

    /// Whether retrying with a larger window could succeed.
    #[must_use]
    pub const fn is_truncated(self) -> bool {
        matches!(self, CodecError::Truncated)
    }
}

/// Outcome code of the last call made on a [`Context`](crate::Context).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error.
    #[default]
    Success = 0,
    /// See [`CodecError::InvalidStart`].
    InvalidStart = 1,
    /// See [`CodecError::Truncated`].
    Truncated = 2,
    /// See [`CodecError::InvalidValue`].
    InvalidValue = 3,
    /// See [`CodecError::Overlong`].
    Overlong = 4,
    /// See [`CodecError::InvalidSequence`].
    InvalidSequence = 5,
    /// See [`CodecError::ValueOutOfRange`].
    ValueOutOfRange = 6,
}

const MESSAGES: [&str; 7] = [
    "Success",
    "Invalid start byte",
    "Truncated sequence",
    "Invalid encoded UTF value",
    "Overlong byte sequence",
    "Invalid byte sequence",
    "Decoded rune exceeds UTF value limit",
];

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::Success,
        ErrorCode::InvalidStart,
        ErrorCode::Truncated,
        ErrorCode::InvalidValue,
        ErrorCode::Overlong,
        ErrorCode::InvalidSequence,
        ErrorCode::ValueOutOfRange,
    ];

    /// The fixed human-readable message for this code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        MESSAGES[self as usize]
    }

    /// The stable numeric value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Whether this code reports a failure.
    #[must_use]
    pub const fn is_error(self) -> bool {
        !matches!(self, ErrorCode::Success)
    }

    /// The failure this code stands for, if any.
    #[must_use]
    pub const fn error(self) -> Option<CodecError> {
        match self {
            ErrorCode::Success => None,
            ErrorCode::InvalidStart => Some(CodecError::InvalidStart),
            ErrorCode::Truncated => Some(CodecError::Truncated),
            ErrorCode::InvalidValue => Some(CodecError::InvalidValue),
            ErrorCode::Overlong => Some(CodecError::Overlong),
            ErrorCode::InvalidSequence => Some(CodecError::InvalidSequence),
            ErrorCode::ValueOutOfRange => Some(CodecError::ValueOutOfRange),
        }
    }

    /// Message for an arbitrary numeric code, falling back to
    /// `"Unknown error N"`.
    #[must_use]
    pub fn describe(code: i32) -> String {
        match ErrorCode::try_from(code) {
            Ok(code) => String::from(code.message()),
            Err(_) => format!("Unknown error {code}"),
        }
    }

    /// Write the message for `code` into `buf` as a NUL-terminated string.
    ///
    /// Returns the message length, not counting the terminator. The buffer is
    /// zeroed before anything is written.
    ///
    /// # Errors
    ///
    /// [`MessageError::UnknownCode`] if `code` is not one of
    /// [`ErrorCode::ALL`]. [`MessageError::BufferTooSmall`] if the message and
    /// its terminator do not fit; in that case `buf` holds as much of the
    /// message as fits, still NUL-terminated when `buf` is not empty.
    pub fn write_message(code: i32, buf: &mut [u8]) -> Result<usize, MessageError> {
        buf.fill(0);

        let code = ErrorCode::try_from(code)?;
        let message = code.message().as_bytes();
        let required = message.len() + 1;

        if buf.len() < required {
            let fits = buf.len().saturating_sub(1);
            buf[..fits].copy_from_slice(&message[..fits]);
            return Err(MessageError::BufferTooSmall { required });
        }

        buf[..message.len()].copy_from_slice(message);
        Ok(message.len())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<CodecError> for ErrorCode {
    fn from(error: CodecError) -> Self {
        error.code()
    }
}

impl<T> From<Result<T, CodecError>> for ErrorCode {
    fn from(result: Result<T, CodecError>) -> Self {
        match result {
            Ok(_) => ErrorCode::Success,
            Err(error) => error.code(),
        }
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = MessageError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| ErrorCode::ALL.get(index).copied())
            .ok_or(MessageError::UnknownCode(code))
    }
}

/// Failure of [`ErrorCode::write_message`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// The code is not one of [`ErrorCode::ALL`].
    #[error("unknown error code {0}")]
    UnknownCode(i32),
    /// The buffer cannot hold the message and its terminator.
    #[error("buffer too small: {required} bytes required")]
    BufferTooSmall {
        /// Bytes needed, terminator included.
        required: usize,
    },
}

/// A [`CodecError`] anchored at a position in a larger input.
///
/// For byte input `offset` is the byte offset where the offending sequence
/// starts; for rune input it is the index of the offending rune.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[error("{error} at byte {offset}")]
pub struct StreamError {
    /// What went wrong.
    pub error: CodecError,
    /// Where it went wrong.
    pub offset: usize,
}

impl StreamError {
    pub(crate) const fn new(error: CodecError, offset: usize) -> Self {
        Self { error, offset }
    }
}
