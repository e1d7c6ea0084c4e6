use std::collections::HashMap;

use async_trait::async_trait;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::types::{CredentialId, KeyHandle, KeyStore};
use crate::errors::AuthenticatorError;
use crate::verification::VerificationContext;

/// DER prefix of a P-256 SubjectPublicKeyInfo, followed by the 65 byte point.
pub(crate) const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

pub(crate) fn p256_public_key_der(point: &[u8]) -> Vec<u8> {
    let mut der = Vec::with_capacity(P256_SPKI_PREFIX.len() + point.len());
    der.extend_from_slice(&P256_SPKI_PREFIX);
    der.extend_from_slice(point);
    der
}

#[derive(Default)]
struct Entries {
    keys: HashMap<KeyHandle, EcdsaKeyPair>,
    bindings: HashMap<CredentialId, KeyHandle>,
}

/// Software key store holding P-256 keys in process memory.
///
/// Private keys never leave the store. Nothing is persisted, so credentials
/// disappear with the process.
pub struct MemoryKeyStore {
    entries: Mutex<Entries>,
    rng: SystemRandom,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory key store");
        Self {
            entries: Mutex::new(Entries::default()),
            rng: SystemRandom::new(),
        }
    }

    /// Adds an existing PKCS#8 P-256 key and returns its handle and DER public key.
    pub async fn import_pkcs8(
        &self,
        pkcs8: &[u8],
    ) -> Result<(Vec<u8>, KeyHandle), AuthenticatorError> {
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8, &self.rng)
            .map_err(|e| AuthenticatorError::UnableToCreateKey(format!("{e}")))?;
        Ok(self.insert(key_pair).await)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.keys.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn insert(&self, key_pair: EcdsaKeyPair) -> (Vec<u8>, KeyHandle) {
        let der = p256_public_key_der(key_pair.public_key().as_ref());
        let handle = KeyHandle::new(Uuid::new_v4().to_string());
        self.entries
            .lock()
            .await
            .keys
            .insert(handle.clone(), key_pair);
        (der, handle)
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn generate(
        &self,
        _ctx: &VerificationContext,
    ) -> Result<(Vec<u8>, KeyHandle), AuthenticatorError> {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &self.rng)
            .map_err(|_| AuthenticatorError::UnableToCreateKey("Key generation failed".to_string()))?;
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &self.rng)
                .map_err(|e| AuthenticatorError::UnableToCreateKey(format!("{e}")))?;

        let (der, handle) = self.insert(key_pair).await;
        tracing::debug!("Generated P-256 key {}", handle.as_str());
        Ok((der, handle))
    }

    async fn bind(&self, id: &CredentialId, handle: &KeyHandle) -> Result<(), AuthenticatorError> {
        let mut entries = self.entries.lock().await;
        if !entries.keys.contains_key(handle) {
            return Err(AuthenticatorError::KeyStore(format!(
                "Unknown key handle: {}",
                handle.as_str()
            )));
        }
        if let Some(existing) = entries.bindings.get(id) {
            if existing != handle {
                tracing::error!("Credential id {} is already bound to another key", id);
                return Err(AuthenticatorError::KeyStore(format!(
                    "Credential id already bound: {id}"
                )));
            }
        }
        entries.bindings.insert(id.clone(), handle.clone());
        Ok(())
    }

    async fn lookup(
        &self,
        id: &CredentialId,
        _ctx: Option<&VerificationContext>,
    ) -> Result<Option<KeyHandle>, AuthenticatorError> {
        Ok(self.entries.lock().await.bindings.get(id).cloned())
    }

    async fn sign(&self, handle: &KeyHandle, data: &[u8]) -> Result<Vec<u8>, AuthenticatorError> {
        let entries = self.entries.lock().await;
        let key_pair = entries.keys.get(handle).ok_or_else(|| {
            AuthenticatorError::InvalidPrivateKeyData(format!(
                "No key for handle {}",
                handle.as_str()
            ))
        })?;
        let signature = key_pair.sign(&self.rng, data).map_err(|_| {
            AuthenticatorError::UnableToCreateSignature("ECDSA signing failed".to_string())
        })?;
        Ok(signature.as_ref().to_vec())
    }
}
