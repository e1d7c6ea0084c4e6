use super::errors::CborError;
use super::types::CborValue;
use super::{major, simple};

/// Maximum depth of nested arrays and maps accepted by the decoder.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Decodes the first CBOR item in `input`.
///
/// Returns the item and the number of bytes it occupied, so callers can
/// continue reading whatever follows it.
pub fn decode(input: &[u8]) -> Result<(CborValue, usize), CborError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.read()?;
    Ok((value, decoder.position()))
}

/// Decodes exactly one CBOR item spanning all of `input`.
pub fn decode_exact(input: &[u8]) -> Result<CborValue, CborError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.read()?;
    match decoder.remaining() {
        0 => Ok(value),
        n => Err(CborError::TrailingBytes(n)),
    }
}

/// Cursor over a CBOR byte stream.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Reads the next item and advances past it.
    pub fn read(&mut self) -> Result<CborValue, CborError> {
        self.read_item(0)
    }

    fn read_item(&mut self, depth: usize) -> Result<CborValue, CborError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(CborError::NestingTooDeep(MAX_NESTING_DEPTH));
        }

        let initial = self.take_byte()?;
        let major_type = initial >> 5;
        let info = initial & 0x1f;

        if major_type == major::SIMPLE {
            return self.read_simple(initial);
        }

        let arg = self.read_argument(major_type, info)?;
        match major_type {
            major::UNSIGNED => Ok(CborValue::Unsigned(arg)),
            major::NEGATIVE => {
                let n = i64::try_from(arg).map_err(|_| CborError::IntegerOverflow)?;
                Ok(CborValue::Negative(-1 - n))
            }
            major::BYTES => {
                let len = self.length(arg)?;
                Ok(CborValue::Bytes(self.take(len)?.to_vec()))
            }
            major::TEXT => {
                let len = self.length(arg)?;
                let raw = self.take(len)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|e| CborError::InvalidUtf8(e.to_string()))?;
                Ok(CborValue::Text(text.to_string()))
            }
            major::ARRAY => {
                let count = self.length(arg)?;
                // Every item needs at least one byte.
                self.ensure(count)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_item(depth + 1)?);
                }
                Ok(CborValue::Array(items))
            }
            major::MAP => {
                let count = self.length(arg)?;
                self.ensure(count.saturating_mul(2))?;
                let mut entries: Vec<(CborValue, CborValue)> = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = self.read_item(depth + 1)?;
                    if !is_same_key_kind(entries.first().map(|(k, _)| k), &key) {
                        return Err(CborError::MixedMapKeys);
                    }
                    let value = self.read_item(depth + 1)?;
                    entries.push((key, value));
                }
                Ok(CborValue::Map(entries))
            }
            _ => Err(CborError::UnsupportedMajorType(major_type)),
        }
    }

    fn read_simple(&mut self, initial: u8) -> Result<CborValue, CborError> {
        match initial {
            simple::FALSE => Ok(CborValue::Bool(false)),
            simple::TRUE => Ok(CborValue::Bool(true)),
            simple::NULL => Ok(CborValue::Null),
            simple::FLOAT32 => {
                let raw = self.take(4)?;
                Ok(CborValue::Float32(f32::from_be_bytes([
                    raw[0], raw[1], raw[2], raw[3],
                ])))
            }
            simple::FLOAT64 => {
                let raw = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Ok(CborValue::Float64(f64::from_be_bytes(buf)))
            }
            0xfc..=0xfe => Err(CborError::ReservedAdditionalInfo(initial & 0x1f)),
            0xff => Err(CborError::IndefiniteLength(major::SIMPLE)),
            other => Err(CborError::UnsupportedSimpleValue(other)),
        }
    }

    fn read_argument(&mut self, major_type: u8, info: u8) -> Result<u64, CborError> {
        match info {
            0..=23 => Ok(u64::from(info)),
            24 => Ok(u64::from(self.take_byte()?)),
            25 => {
                let raw = self.take(2)?;
                Ok(u64::from(u16::from_be_bytes([raw[0], raw[1]])))
            }
            26 => {
                let raw = self.take(4)?;
                Ok(u64::from(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])))
            }
            27 => {
                let raw = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Ok(u64::from_be_bytes(buf))
            }
            28..=30 => Err(CborError::ReservedAdditionalInfo(info)),
            _ if major_type == major::TAG => Err(CborError::UnsupportedMajorType(major::TAG)),
            _ => Err(CborError::IndefiniteLength(major_type)),
        }
    }

    /// Converts a length argument and rejects lengths the input cannot hold.
    fn length(&self, arg: u64) -> Result<usize, CborError> {
        let len = usize::try_from(arg).map_err(|_| CborError::IntegerOverflow)?;
        self.ensure(len)?;
        Ok(len)
    }

    fn ensure(&self, needed: usize) -> Result<(), CborError> {
        if needed > self.remaining() {
            return Err(CborError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take_byte(&mut self) -> Result<u8, CborError> {
        Ok(self.take(1)?[0])
    }

    /// Reads `len` raw bytes, for binary structures that embed CBOR items.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], CborError> {
        self.ensure(len)?;
        let slice = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

fn is_same_key_kind(first: Option<&CborValue>, key: &CborValue) -> bool {
    match (first, key) {
        (_, k) if !k.is_integer() && k.as_text().is_none() => false,
        (None, _) => true,
        (Some(f), k) => f.is_integer() == k.is_integer(),
    }
}
