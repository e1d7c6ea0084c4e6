use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AuthenticatorError;
use crate::utils::{base64url_decode, base64url_encode, sha256};
use crate::verification::VerificationContext;

/// Opaque reference to a private key held by a [`KeyStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyHandle(String);

impl KeyHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SHA-256 of the credential public key's DER encoding.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialId(Vec<u8>);

impl CredentialId {
    pub fn from_public_key_der(der: &[u8]) -> Self {
        Self(sha256(der))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_base64url(id: &str) -> Result<Self, AuthenticatorError> {
        Ok(Self(base64url_decode(id)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64url(&self) -> String {
        base64url_encode(&self.0)
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialId({})", self.to_base64url())
    }
}

/// Asymmetric key facility keyed by credential id.
///
/// Keys are P-256 and sign with ECDSA-SHA256, returning ASN.1 DER signatures.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Creates a key pair and returns its public key as DER SubjectPublicKeyInfo.
    async fn generate(
        &self,
        ctx: &VerificationContext,
    ) -> Result<(Vec<u8>, KeyHandle), AuthenticatorError>;

    async fn bind(&self, id: &CredentialId, handle: &KeyHandle) -> Result<(), AuthenticatorError>;

    async fn lookup(
        &self,
        id: &CredentialId,
        ctx: Option<&VerificationContext>,
    ) -> Result<Option<KeyHandle>, AuthenticatorError>;

    async fn sign(&self, handle: &KeyHandle, data: &[u8]) -> Result<Vec<u8>, AuthenticatorError>;
}

/// A credential private key, usable for signing without exposing key bytes.
#[derive(Clone)]
pub struct CredentialKey {
    store: Arc<dyn KeyStore>,
    handle: KeyHandle,
}

impl CredentialKey {
    pub fn new(store: Arc<dyn KeyStore>, handle: KeyHandle) -> Self {
        Self { store, handle }
    }

    pub fn handle(&self) -> &KeyHandle {
        &self.handle
    }

    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, AuthenticatorError> {
        self.store.sign(&self.handle, data).await
    }
}

impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialKey")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
