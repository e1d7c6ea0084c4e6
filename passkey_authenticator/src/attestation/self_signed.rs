use async_trait::async_trait;

use super::types::{AttestationFormat, AttestationProvider};
use super::utils::signature_base;
use crate::cbor::CborValue;
use crate::cose::COSE_ALG_ES256;
use crate::errors::AuthenticatorError;
use crate::keystore::CredentialKey;

/// Packed self attestation: the credential key signs its own registration.
#[derive(Debug, Default)]
pub struct SelfAttestation {
    credential_key: Option<CredentialKey>,
}

impl SelfAttestation {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttestationProvider for SelfAttestation {
    fn format(&self) -> AttestationFormat {
        AttestationFormat::Packed
    }

    fn bind_credential_key(&mut self, key: CredentialKey) {
        self.credential_key = Some(key);
    }

    async fn statement(
        &self,
        auth_data: &[u8],
        client_data_hash: &[u8],
    ) -> Result<CborValue, AuthenticatorError> {
        let base = signature_base(auth_data, client_data_hash)?;
        let key = self.credential_key.as_ref().ok_or_else(|| {
            AuthenticatorError::InvalidPrivateKeyData(
                "No credential key bound for self attestation".to_string(),
            )
        })?;

        let sig = key.sign(&base).await?;
        tracing::debug!("Created packed self attestation signature");

        Ok(CborValue::text_map([
            ("alg", CborValue::from(COSE_ALG_ES256)),
            ("sig", CborValue::Bytes(sig)),
        ]))
    }
}
