use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::cbor::CborValue;
use crate::errors::AuthenticatorError;
use crate::keystore::CredentialKey;

/// The `fmt` value of an attestation object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationFormat {
    None,
    Packed,
}

impl AttestationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttestationFormat::None => "none",
            AttestationFormat::Packed => "packed",
        }
    }
}

impl fmt::Display for AttestationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces the `attStmt` map for a registration.
///
/// The engine only talks to providers through this trait.
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    fn format(&self) -> AttestationFormat;

    /// AAGUID this provider mandates, overriding the configured one.
    fn aaguid(&self) -> Option<Uuid> {
        None
    }

    /// Hands over the key of the credential being created. Providers that
    /// do not sign with the credential key ignore it.
    fn bind_credential_key(&mut self, _key: CredentialKey) {}

    /// Builds the statement over `auth_data || client_data_hash`.
    async fn statement(
        &self,
        auth_data: &[u8],
        client_data_hash: &[u8],
    ) -> Result<CborValue, AuthenticatorError>;
}
