use thiserror::Error;

/// Errors raised while decoding CBOR.
///
/// Untrusted input only ever produces one of these; the decoder does not
/// panic on truncated or hostile byte streams.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("reserved additional information value {0}")]
    ReservedAdditionalInfo(u8),

    #[error("indefinite-length items are not supported (major type {0})")]
    IndefiniteLength(u8),

    #[error("unsupported major type {0}")]
    UnsupportedMajorType(u8),

    #[error("unsupported simple value or float width 0x{0:02x}")]
    UnsupportedSimpleValue(u8),

    #[error("text string is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("integer does not fit the supported range")]
    IntegerOverflow,

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("map keys must be all integers or all text strings")]
    MixedMapKeys,

    #[error("{0} trailing bytes after the top-level item")]
    TrailingBytes(usize),
}
