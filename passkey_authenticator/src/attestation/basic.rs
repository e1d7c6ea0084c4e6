use async_trait::async_trait;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use uuid::Uuid;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use super::types::{AttestationFormat, AttestationProvider};
use super::utils::{pem_body, signature_base};
use crate::cbor::CborValue;
use crate::cose::COSE_ALG_ES256;
use crate::errors::AuthenticatorError;
use crate::utils::base64_decode_lenient;

/// Packed basic attestation with a provisioned attestation key and certificate.
///
/// The key is base64 PKCS#8 DER and the certificate is PEM. Both are decoded
/// on every call to [`AttestationProvider::statement`], so a bad input
/// surfaces as a typed error at registration time.
#[derive(Clone)]
pub struct BasicAttestation {
    private_key: String,
    certificate: String,
    aaguid: Option<Uuid>,
}

impl BasicAttestation {
    pub fn new(private_key: impl Into<String>, certificate: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            certificate: certificate.into(),
            aaguid: None,
        }
    }

    /// The AAGUID of the authenticator model the certificate attests.
    pub fn with_aaguid(mut self, aaguid: Uuid) -> Self {
        self.aaguid = Some(aaguid);
        self
    }

    fn load_key(&self, rng: &SystemRandom) -> Result<EcdsaKeyPair, AuthenticatorError> {
        let pkcs8 = base64_decode_lenient(&self.private_key).map_err(|e| {
            AuthenticatorError::InvalidPrivateKeyData(format!("Attestation key: {}", e))
        })?;
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &pkcs8, rng).map_err(|e| {
            AuthenticatorError::UnableToCreateKey(format!("Attestation key rejected: {}", e))
        })
    }

    fn load_certificate(&self, key_pair: &EcdsaKeyPair) -> Result<Vec<u8>, AuthenticatorError> {
        let der = base64_decode_lenient(&pem_body(&self.certificate))
            .map_err(|e| AuthenticatorError::InvalidCertificate(format!("{}", e)))?;

        let (_, cert) = X509Certificate::from_der(&der).map_err(|e| {
            AuthenticatorError::InvalidCertificate(format!("Failed to parse certificate: {}", e))
        })?;

        match cert.public_key().parsed() {
            Ok(PublicKey::EC(point)) if point.data() == key_pair.public_key().as_ref() => {}
            _ => {
                return Err(AuthenticatorError::InvalidCertificate(
                    "Certificate public key does not match the attestation key".to_string(),
                ));
            }
        }

        tracing::debug!("Attestation certificate subject: {}", cert.subject());
        Ok(der)
    }
}

impl std::fmt::Debug for BasicAttestation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAttestation")
            .field("aaguid", &self.aaguid)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AttestationProvider for BasicAttestation {
    fn format(&self) -> AttestationFormat {
        AttestationFormat::Packed
    }

    fn aaguid(&self) -> Option<Uuid> {
        self.aaguid
    }

    async fn statement(
        &self,
        auth_data: &[u8],
        client_data_hash: &[u8],
    ) -> Result<CborValue, AuthenticatorError> {
        let base = signature_base(auth_data, client_data_hash)?;

        let rng = SystemRandom::new();
        let key_pair = self.load_key(&rng)?;
        let cert_der = self.load_certificate(&key_pair)?;

        let sig = key_pair.sign(&rng, &base).map_err(|_| {
            AuthenticatorError::UnableToCreateSignature("ECDSA signing failed".to_string())
        })?;
        tracing::debug!("Created packed basic attestation signature");

        Ok(CborValue::text_map([
            ("alg", CborValue::from(COSE_ALG_ES256)),
            ("x5c", CborValue::Array(vec![CborValue::Bytes(cert_der)])),
            ("sig", CborValue::Bytes(sig.as_ref().to_vec())),
        ]))
    }
}
