//! Minimal RFC 7049 CBOR codec.
//!
//! Covers the data model WebAuthn needs: integers, byte and text strings,
//! arrays, maps, booleans, null and 32/64-bit floats. Encoding uses the
//! shortest argument form and keeps map entries in insertion order.

mod decoder;
mod encoder;
mod errors;
mod types;

pub use decoder::{Decoder, MAX_NESTING_DEPTH, decode, decode_exact};
pub use encoder::{Encoder, encode};
pub use errors::CborError;
pub use types::CborValue;

pub(crate) mod major {
    pub(crate) const UNSIGNED: u8 = 0;
    pub(crate) const NEGATIVE: u8 = 1;
    pub(crate) const BYTES: u8 = 2;
    pub(crate) const TEXT: u8 = 3;
    pub(crate) const ARRAY: u8 = 4;
    pub(crate) const MAP: u8 = 5;
    pub(crate) const TAG: u8 = 6;
    pub(crate) const SIMPLE: u8 = 7;
}

pub(crate) mod simple {
    pub(crate) const FALSE: u8 = 0xf4;
    pub(crate) const TRUE: u8 = 0xf5;
    pub(crate) const NULL: u8 = 0xf6;
    pub(crate) const FLOAT32: u8 = 0xfa;
    pub(crate) const FLOAT64: u8 = 0xfb;
}
