//! Error types for MessagePack encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur while encoding a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A str, bin, ext, array or map is longer than the widest length field
    /// (32 bits) can express. Nothing is written when this is returned.
    #[error("{kind} of length {len} exceeds the maximum encodable length")]
    PayloadTooLarge { kind: &'static str, len: usize },
}

/// Errors that can occur while decoding bytes into a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte at `offset` is not assigned by the format.
    #[error("unknown tag byte 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// The input ends before a declared length or fixed-width field is satisfied.
    #[error("truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Arrays and maps are nested deeper than the configured limit.
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    /// A str payload starting at `offset` is not valid UTF-8.
    #[error("invalid UTF-8 in string payload at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

/// Errors converting between extension values and their typed forms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtError {
    /// The extension type tag is not the one the conversion expects.
    #[error("expected extension type {expected}, found {found}")]
    WrongType { expected: i8, found: i8 },

    /// The payload length matches none of the layouts for this extension.
    #[error("invalid payload length {0} for extension")]
    InvalidLength(usize),

    /// Nanoseconds must be below one second.
    #[error("nanoseconds {0} out of range (must be < 1_000_000_000)")]
    InvalidNanoseconds(u32),

    /// The value is not an extension at all.
    #[error("value is not an extension")]
    NotExt,
}

/// Convenience alias for encoding results.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Convenience alias for decoding results.
pub type Result<T> = std::result::Result<T, DecodeError>;
