//! COSE_Key encoding for EC2 public keys (RFC 8152, section 13.1.1).

use oid_registry::{OID_EC_P256, OID_KEY_TYPE_EC_PUBLIC_KEY};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use crate::cbor::{self, CborValue};
use crate::errors::AuthenticatorError;

pub const COSE_KTY_EC2: i64 = 2;
pub const COSE_ALG_ES256: i64 = -7;
pub const COSE_CRV_P256: i64 = 1;

const KEY_KTY: i64 = 1;
const KEY_ALG: i64 = 3;
const KEY_CRV: i64 = -1;
const KEY_X: i64 = -2;
const KEY_Y: i64 = -3;

const COORD_LEN: usize = 32;

/// An EC2 public key with P-256 sized coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseKeyEc2 {
    pub alg: i64,
    pub crv: i64,
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl CoseKeyEc2 {
    pub fn new(alg: i64, crv: i64, x: [u8; 32], y: [u8; 32]) -> Self {
        Self { alg, crv, x, y }
    }

    /// `{1: 2, 3: alg, -1: crv, -2: x, -3: y}` in that order.
    pub fn to_cbor(&self) -> CborValue {
        CborValue::int_map([
            (KEY_KTY, CborValue::from(COSE_KTY_EC2)),
            (KEY_ALG, CborValue::from(self.alg)),
            (KEY_CRV, CborValue::from(self.crv)),
            (KEY_X, CborValue::Bytes(self.x.to_vec())),
            (KEY_Y, CborValue::Bytes(self.y.to_vec())),
        ])
    }

    pub fn encode(&self) -> Vec<u8> {
        cbor::encode(&self.to_cbor())
    }

    pub fn from_cbor(value: &CborValue) -> Result<Self, AuthenticatorError> {
        if value.as_map().is_none() {
            return Err(AuthenticatorError::InvalidAttestationData(
                "COSE key is not a map".to_string(),
            ));
        }

        let kty = int_field(value, KEY_KTY, "kty")?;
        if kty != COSE_KTY_EC2 {
            return Err(AuthenticatorError::InvalidAttestationData(format!(
                "Unsupported COSE key type: {}",
                kty
            )));
        }

        Ok(Self {
            alg: int_field(value, KEY_ALG, "alg")?,
            crv: int_field(value, KEY_CRV, "crv")?,
            x: coord_field(value, KEY_X, "x")?,
            y: coord_field(value, KEY_Y, "y")?,
        })
    }

    /// Decodes a COSE key that must span all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, AuthenticatorError> {
        let value = cbor::decode_exact(bytes)?;
        Self::from_cbor(&value)
    }

    /// Builds a key from a DER SubjectPublicKeyInfo holding a P-256 point.
    pub fn from_public_key_der(der: &[u8], alg: i64) -> Result<Self, AuthenticatorError> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(der).map_err(|e| {
            AuthenticatorError::InvalidPrivateKeyData(format!("Invalid public key DER: {}", e))
        })?;

        if spki.algorithm.algorithm.as_bytes() != OID_KEY_TYPE_EC_PUBLIC_KEY.as_bytes() {
            return Err(AuthenticatorError::InvalidPrivateKeyData(
                "Public key is not an EC key".to_string(),
            ));
        }

        let curve = spki
            .algorithm
            .parameters
            .as_ref()
            .and_then(|p| p.as_oid().ok());
        match curve {
            Some(oid) if oid.as_bytes() == OID_EC_P256.as_bytes() => {}
            _ => {
                return Err(AuthenticatorError::InvalidPrivateKeyData(
                    "Public key is not on the P-256 curve".to_string(),
                ));
            }
        }

        let point = match spki.parsed() {
            Ok(PublicKey::EC(point)) => point,
            Ok(_) => {
                return Err(AuthenticatorError::InvalidPrivateKeyData(
                    "Public key is not an EC point".to_string(),
                ));
            }
            Err(e) => {
                return Err(AuthenticatorError::InvalidPrivateKeyData(format!(
                    "Invalid EC public key: {}",
                    e
                )));
            }
        };

        Self::from_uncompressed_point(point.data(), alg)
    }

    /// Splits a SEC1 uncompressed point (`04 || x || y`).
    pub fn from_uncompressed_point(point: &[u8], alg: i64) -> Result<Self, AuthenticatorError> {
        if point.len() != 1 + 2 * COORD_LEN || point[0] != 0x04 {
            return Err(AuthenticatorError::InvalidPrivateKeyData(format!(
                "Expected a 65 byte uncompressed point, got {} bytes",
                point.len()
            )));
        }

        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&point[1..1 + COORD_LEN]);
        y.copy_from_slice(&point[1 + COORD_LEN..]);
        Ok(Self::new(alg, COSE_CRV_P256, x, y))
    }

    /// `04 || x || y`, the form `ring` verifies against.
    pub fn uncompressed_point(&self) -> Vec<u8> {
        let mut point = Vec::with_capacity(1 + 2 * COORD_LEN);
        point.push(0x04);
        point.extend_from_slice(&self.x);
        point.extend_from_slice(&self.y);
        point
    }
}

fn int_field(map: &CborValue, key: i64, name: &str) -> Result<i64, AuthenticatorError> {
    map.map_get_int(key)
        .and_then(|v| v.as_integer())
        .and_then(|i| i64::try_from(i).ok())
        .ok_or_else(|| {
            AuthenticatorError::InvalidAttestationData(format!(
                "Missing or invalid COSE {}",
                name
            ))
        })
}

fn coord_field(map: &CborValue, key: i64, name: &str) -> Result<[u8; 32], AuthenticatorError> {
    let bytes = map.map_get_int(key).and_then(|v| v.as_bytes()).ok_or_else(|| {
        AuthenticatorError::InvalidAttestationData(format!("Missing COSE {} coordinate", name))
    })?;
    bytes.try_into().map_err(|_| {
        AuthenticatorError::InvalidAttestationData(format!(
            "COSE {} coordinate must be 32 bytes, got {}",
            name,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_PUBLIC_POINT, test_public_key_der};

    fn sample_key() -> CoseKeyEc2 {
        CoseKeyEc2::new(COSE_ALG_ES256, COSE_CRV_P256, [0x11; 32], [0x22; 32])
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample_key().encode();
        // a5 01 02 03 26 20 01 21 58 20 <x> 22 58 20 <y>
        assert_eq!(&bytes[..10], &[0xa5, 0x01, 0x02, 0x03, 0x26, 0x20, 0x01, 0x21, 0x58, 0x20]);
        assert_eq!(&bytes[10..42], &[0x11; 32]);
        assert_eq!(&bytes[42..45], &[0x22, 0x58, 0x20]);
        assert_eq!(&bytes[45..], &[0x22; 32]);
        assert_eq!(bytes.len(), 77);
    }

    #[test]
    fn test_encoded_map_has_exactly_five_entries() {
        let value = sample_key().to_cbor();
        let entries = value.as_map().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(value.map_get_int(1).and_then(|v| v.as_integer()), Some(2));
        assert_eq!(value.map_get_int(3).and_then(|v| v.as_integer()), Some(-7));
        assert_eq!(value.map_get_int(-1).and_then(|v| v.as_integer()), Some(1));
        assert_eq!(value.map_get_int(-2).and_then(|v| v.as_bytes()).map(<[u8]>::len), Some(32));
        assert_eq!(value.map_get_int(-3).and_then(|v| v.as_bytes()).map(<[u8]>::len), Some(32));
    }

    #[test]
    fn test_decode_recovers_values() {
        let key = CoseKeyEc2::new(-35, 2, [0xab; 32], [0xcd; 32]);
        let decoded = CoseKeyEc2::decode(&key.encode()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_decode_rejects_wrong_kty() {
        let value = CborValue::int_map([
            (1, CborValue::from(1i64)),
            (3, CborValue::from(-8i64)),
            (-1, CborValue::from(6i64)),
            (-2, CborValue::Bytes(vec![0; 32])),
        ]);
        let err = CoseKeyEc2::decode(&cbor::encode(&value)).unwrap_err();
        assert!(matches!(err, AuthenticatorError::InvalidAttestationData(_)));
    }

    #[test]
    fn test_decode_rejects_short_coordinate() {
        let value = CborValue::int_map([
            (1, CborValue::from(2i64)),
            (3, CborValue::from(-7i64)),
            (-1, CborValue::from(1i64)),
            (-2, CborValue::Bytes(vec![0; 31])),
            (-3, CborValue::Bytes(vec![0; 32])),
        ]);
        let err = CoseKeyEc2::from_cbor(&value).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_decode_rejects_malformed_cbor() {
        let err = CoseKeyEc2::decode(&[0xa5, 0x01]).unwrap_err();
        assert!(matches!(err, AuthenticatorError::Decode(_)));
    }

    #[test]
    fn test_from_public_key_der() {
        let key = CoseKeyEc2::from_public_key_der(&test_public_key_der(), COSE_ALG_ES256).unwrap();
        assert_eq!(key.alg, COSE_ALG_ES256);
        assert_eq!(key.crv, COSE_CRV_P256);
        assert_eq!(key.uncompressed_point(), TEST_PUBLIC_POINT.to_vec());
    }

    #[test]
    fn test_from_public_key_der_rejects_garbage() {
        let err = CoseKeyEc2::from_public_key_der(&[0x30, 0x03, 0x02, 0x01, 0x01], COSE_ALG_ES256)
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::InvalidPrivateKeyData(_)));
    }

    #[test]
    fn test_from_uncompressed_point_rejects_compressed() {
        let mut point = vec![0x02];
        point.extend_from_slice(&[0u8; 32]);
        assert!(CoseKeyEc2::from_uncompressed_point(&point, COSE_ALG_ES256).is_err());
    }
}
