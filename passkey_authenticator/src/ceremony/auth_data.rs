use uuid::Uuid;

use crate::cbor::{self, CborValue, Decoder};
use crate::cose::CoseKeyEc2;
use crate::errors::AuthenticatorError;
use crate::utils::sha256;

/// Flags for AuthenticatorData as defined in WebAuthn spec Level 2
pub mod flags {
    /// User Present (UP) - Bit 0
    pub const UP: u8 = 1 << 0;
    /// User Verified (UV) - Bit 2
    pub const UV: u8 = 1 << 2;
    /// Attested Credential Data Present - Bit 6
    pub const AT: u8 = 1 << 6;
    /// Extension Data Present - Bit 7
    pub const ED: u8 = 1 << 7;
}

/// Largest credential id WebAuthn allows.
const MAX_CREDENTIAL_ID_LEN: usize = 1023;

const HEADER_LEN: usize = 37;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: Uuid,
    pub credential_id: Vec<u8>,
    pub public_key: CoseKeyEc2,
}

impl AttestedCredentialData {
    pub fn new(
        aaguid: Uuid,
        credential_id: Vec<u8>,
        public_key: CoseKeyEc2,
    ) -> Result<Self, AuthenticatorError> {
        if credential_id.is_empty() || credential_id.len() > MAX_CREDENTIAL_ID_LEN {
            return Err(AuthenticatorError::InvalidAttestationData(format!(
                "Invalid credential ID length: {}",
                credential_id.len()
            )));
        }
        Ok(Self {
            aaguid,
            credential_id,
            public_key,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.aaguid.as_bytes());
        out.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.credential_id);
        out.extend_from_slice(&self.public_key.encode());
    }
}

/// AuthenticatorData structure as defined in WebAuthn spec Level 2
/// https://www.w3.org/TR/webauthn-2/#sctn-authenticator-data
///
/// Layout: rpIdHash (32) | flags (1) | counter (4, big-endian)
/// | attested credential data (if AT) | extensions map (if ED).
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub counter: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    pub extensions: Option<CborValue>,
}

impl AuthenticatorData {
    /// Starts authenticator data for `rp_id` with the given UP/UV flags. The
    /// AT and ED bits follow the optional parts added later.
    pub fn new(rp_id: &str, flags: u8, counter: u32) -> Self {
        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&sha256(rp_id.as_bytes()));
        Self {
            rp_id_hash,
            flags: flags & !(flags::AT | flags::ED),
            counter,
            attested_credential_data: None,
            extensions: None,
        }
    }

    pub fn with_attested_credential_data(mut self, data: AttestedCredentialData) -> Self {
        self.flags |= flags::AT;
        self.attested_credential_data = Some(data);
        self
    }

    /// Adds a CBOR extensions map. Empty maps are left out.
    pub fn with_extensions(mut self, extensions: CborValue) -> Self {
        if extensions.as_map().is_some_and(|m| !m.is_empty()) {
            self.flags |= flags::ED;
            self.extensions = Some(extensions);
        }
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + 128);
        out.extend_from_slice(&self.rp_id_hash);
        out.push(self.flags);
        out.extend_from_slice(&self.counter.to_be_bytes());
        if let Some(acd) = &self.attested_credential_data {
            acd.write(&mut out);
        }
        if let Some(ext) = &self.extensions {
            out.extend_from_slice(&cbor::encode(ext));
        }
        out
    }

    pub fn parse(data: &[u8]) -> Result<Self, AuthenticatorError> {
        if data.len() < HEADER_LEN {
            return Err(AuthenticatorError::InvalidAttestationData(format!(
                "Authenticator data too short: {} bytes",
                data.len()
            )));
        }

        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&data[..32]);
        let flags = data[32];
        let counter = u32::from_be_bytes([data[33], data[34], data[35], data[36]]);

        let mut decoder = Decoder::new(&data[HEADER_LEN..]);
        let attested_credential_data = if flags & flags::AT != 0 {
            Some(parse_attested_credential_data(&mut decoder)?)
        } else {
            None
        };

        let extensions = if flags & flags::ED != 0 {
            let ext = decoder.read()?;
            if ext.as_map().is_none() {
                return Err(AuthenticatorError::InvalidAttestationData(
                    "Extensions are not a CBOR map".to_string(),
                ));
            }
            Some(ext)
        } else {
            None
        };

        if decoder.remaining() != 0 {
            return Err(AuthenticatorError::InvalidAttestationData(format!(
                "{} unexpected trailing bytes in authenticator data",
                decoder.remaining()
            )));
        }

        Ok(Self {
            rp_id_hash,
            flags,
            counter,
            attested_credential_data,
            extensions,
        })
    }

    pub fn rp_id_matches(&self, rp_id: &str) -> bool {
        self.rp_id_hash[..] == sha256(rp_id.as_bytes())[..]
    }

    pub fn is_user_present(&self) -> bool {
        (self.flags & flags::UP) != 0
    }

    pub fn is_user_verified(&self) -> bool {
        (self.flags & flags::UV) != 0
    }

    pub fn has_attested_credential_data(&self) -> bool {
        (self.flags & flags::AT) != 0
    }

    pub fn has_extension_data(&self) -> bool {
        (self.flags & flags::ED) != 0
    }
}

fn parse_attested_credential_data(
    decoder: &mut Decoder<'_>,
) -> Result<AttestedCredentialData, AuthenticatorError> {
    let header = decoder.take(18).map_err(|_| {
        AuthenticatorError::InvalidAttestationData(
            "Authenticator data too short for attested credential data".to_string(),
        )
    })?;
    let mut aaguid = [0u8; 16];
    aaguid.copy_from_slice(&header[..16]);
    let id_len = u16::from_be_bytes([header[16], header[17]]) as usize;

    let credential_id = decoder
        .take(id_len)
        .map_err(|_| {
            AuthenticatorError::InvalidAttestationData(
                "Authenticator data too short for credential ID".to_string(),
            )
        })?
        .to_vec();

    let public_key = CoseKeyEc2::from_cbor(&decoder.read()?)?;
    AttestedCredentialData::new(Uuid::from_bytes(aaguid), credential_id, public_key)
}
