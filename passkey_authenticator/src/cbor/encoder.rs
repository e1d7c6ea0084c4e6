use super::types::CborValue;
use super::{major, simple};

/// Serializes a value to CBOR bytes. Encoding cannot fail.
pub fn encode(value: &CborValue) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.write(value);
    encoder.into_bytes()
}

/// Appends CBOR items to an owned buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write(&mut self, value: &CborValue) {
        match value {
            CborValue::Unsigned(u) => self.write_head(major::UNSIGNED, *u),
            // -1 - v, which for v < 0 is the bitwise complement.
            CborValue::Negative(v) if *v < 0 => self.write_head(major::NEGATIVE, !(*v) as u64),
            CborValue::Negative(v) => self.write_head(major::UNSIGNED, *v as u64),
            CborValue::Bytes(b) => {
                self.write_head(major::BYTES, b.len() as u64);
                self.buf.extend_from_slice(b);
            }
            CborValue::Text(s) => {
                self.write_head(major::TEXT, s.len() as u64);
                self.buf.extend_from_slice(s.as_bytes());
            }
            CborValue::Array(items) => {
                self.write_head(major::ARRAY, items.len() as u64);
                for item in items {
                    self.write(item);
                }
            }
            CborValue::Map(entries) => {
                self.write_head(major::MAP, entries.len() as u64);
                for (k, v) in entries {
                    self.write(k);
                    self.write(v);
                }
            }
            CborValue::Bool(false) => self.buf.push(simple::FALSE),
            CborValue::Bool(true) => self.buf.push(simple::TRUE),
            CborValue::Null => self.buf.push(simple::NULL),
            CborValue::Float32(f) => {
                self.buf.push(simple::FLOAT32);
                self.buf.extend_from_slice(&f.to_be_bytes());
            }
            CborValue::Float64(f) => {
                self.buf.push(simple::FLOAT64);
                self.buf.extend_from_slice(&f.to_be_bytes());
            }
        }
    }

    /// Writes the initial byte and the shortest argument encoding.
    fn write_head(&mut self, major_type: u8, arg: u64) {
        let mt = major_type << 5;
        if arg < 24 {
            self.buf.push(mt | arg as u8);
        } else if arg <= u64::from(u8::MAX) {
            self.buf.push(mt | 24);
            self.buf.push(arg as u8);
        } else if arg <= u64::from(u16::MAX) {
            self.buf.push(mt | 25);
            self.buf.extend_from_slice(&(arg as u16).to_be_bytes());
        } else if arg <= u64::from(u32::MAX) {
            self.buf.push(mt | 26);
            self.buf.extend_from_slice(&(arg as u32).to_be_bytes());
        } else {
            self.buf.push(mt | 27);
            self.buf.extend_from_slice(&arg.to_be_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &CborValue) -> String {
        encode(value).iter().map(|b| format!("{b:02x}")).collect()
    }

    // Vectors from RFC 7049 Appendix A.

    #[test]
    fn test_unsigned_integers() {
        assert_eq!(hex(&CborValue::Unsigned(0)), "00");
        assert_eq!(hex(&CborValue::Unsigned(1)), "01");
        assert_eq!(hex(&CborValue::Unsigned(10)), "0a");
        assert_eq!(hex(&CborValue::Unsigned(23)), "17");
        assert_eq!(hex(&CborValue::Unsigned(24)), "1818");
        assert_eq!(hex(&CborValue::Unsigned(25)), "1819");
        assert_eq!(hex(&CborValue::Unsigned(100)), "1864");
        assert_eq!(hex(&CborValue::Unsigned(1000)), "1903e8");
        assert_eq!(hex(&CborValue::Unsigned(1_000_000)), "1a000f4240");
        assert_eq!(hex(&CborValue::Unsigned(1_000_000_000_000)), "1b000000e8d4a51000");
        assert_eq!(hex(&CborValue::Unsigned(u64::MAX)), "1bffffffffffffffff");
    }

    #[test]
    fn test_negative_integers() {
        assert_eq!(hex(&CborValue::Negative(-1)), "20");
        assert_eq!(hex(&CborValue::Negative(-10)), "29");
        assert_eq!(hex(&CborValue::Negative(-100)), "3863");
        assert_eq!(hex(&CborValue::Negative(-1000)), "3903e7");
        assert_eq!(hex(&CborValue::Negative(i64::MIN)), "3b7fffffffffffffff");
    }

    #[test]
    fn test_floats() {
        assert_eq!(hex(&CborValue::Float32(100000.0)), "fa47c35000");
        assert_eq!(hex(&CborValue::Float32(3.4028234663852886e+38)), "fa7f7fffff");
        assert_eq!(hex(&CborValue::Float64(1.1)), "fb3ff199999999999a");
        assert_eq!(hex(&CborValue::Float64(1.0e+300)), "fb7e37e43c8800759c");
        assert_eq!(hex(&CborValue::Float64(-4.1)), "fbc010666666666666");
    }

    #[test]
    fn test_simple_values() {
        assert_eq!(hex(&CborValue::Bool(false)), "f4");
        assert_eq!(hex(&CborValue::Bool(true)), "f5");
        assert_eq!(hex(&CborValue::Null), "f6");
    }

    #[test]
    fn test_strings() {
        assert_eq!(hex(&CborValue::Bytes(vec![])), "40");
        assert_eq!(hex(&CborValue::Bytes(vec![1, 2, 3, 4])), "4401020304");
        assert_eq!(hex(&CborValue::from("")), "60");
        assert_eq!(hex(&CborValue::from("a")), "6161");
        assert_eq!(hex(&CborValue::from("IETF")), "6449455446");
        assert_eq!(hex(&CborValue::from("\"\\")), "62225c");
        assert_eq!(hex(&CborValue::from("\u{00fc}")), "62c3bc");
        assert_eq!(hex(&CborValue::from("\u{6c34}")), "63e6b0b4");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(hex(&CborValue::Array(vec![])), "80");
        let one_two_three = CborValue::Array(vec![
            CborValue::Unsigned(1),
            CborValue::Unsigned(2),
            CborValue::Unsigned(3),
        ]);
        assert_eq!(hex(&one_two_three), "83010203");

        let nested = CborValue::Array(vec![
            CborValue::Unsigned(1),
            CborValue::Array(vec![CborValue::Unsigned(2), CborValue::Unsigned(3)]),
            CborValue::Array(vec![CborValue::Unsigned(4), CborValue::Unsigned(5)]),
        ]);
        assert_eq!(hex(&nested), "8301820203820405");

        let twenty_five = CborValue::Array((1..=25).map(CborValue::Unsigned).collect());
        assert_eq!(
            hex(&twenty_five),
            "98190102030405060708090a0b0c0d0e0f101112131415161718181819"
        );
    }

    #[test]
    fn test_maps() {
        assert_eq!(hex(&CborValue::empty_map()), "a0");
        let int_keys = CborValue::int_map([(1, CborValue::Unsigned(2)), (3, CborValue::Unsigned(4))]);
        assert_eq!(hex(&int_keys), "a201020304");

        let text_keys = CborValue::text_map([
            ("a", CborValue::Unsigned(1)),
            ("b", CborValue::Array(vec![CborValue::Unsigned(2), CborValue::Unsigned(3)])),
        ]);
        assert_eq!(hex(&text_keys), "a26161016162820203");

        let letters = CborValue::text_map([
            ("a", CborValue::from("A")),
            ("b", CborValue::from("B")),
            ("c", CborValue::from("C")),
            ("d", CborValue::from("D")),
            ("e", CborValue::from("E")),
        ]);
        assert_eq!(hex(&letters), "a56161614161626142616361436164614461656145");
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let value = CborValue::text_map([
            ("fmt", CborValue::from("none")),
            ("attStmt", CborValue::empty_map()),
            ("authData", CborValue::Bytes(vec![0xaa])),
        ]);
        let bytes = encode(&value);
        assert_eq!(bytes[0], 0xa3);
        assert_eq!(&bytes[1..5], b"\x63fmt");
    }

    #[test]
    fn test_long_byte_string_uses_two_byte_length() {
        let bytes = encode(&CborValue::Bytes(vec![0u8; 300]));
        assert_eq!(&bytes[..3], &[0x59, 0x01, 0x2c]);
        assert_eq!(bytes.len(), 303);
    }

    #[test]
    fn test_encoder_appends_items() {
        let mut encoder = Encoder::new();
        encoder.write(&CborValue::Unsigned(1));
        encoder.write(&CborValue::Null);
        assert_eq!(encoder.into_bytes(), vec![0x01, 0xf6]);
    }
}
