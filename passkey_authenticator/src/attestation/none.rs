use async_trait::async_trait;
use uuid::Uuid;

use super::types::{AttestationFormat, AttestationProvider};
use crate::cbor::CborValue;
use crate::errors::AuthenticatorError;

/// `fmt = "none"`: no statement, all-zero AAGUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAttestation;

impl NoneAttestation {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AttestationProvider for NoneAttestation {
    fn format(&self) -> AttestationFormat {
        AttestationFormat::None
    }

    fn aaguid(&self) -> Option<Uuid> {
        Some(Uuid::nil())
    }

    async fn statement(
        &self,
        _auth_data: &[u8],
        _client_data_hash: &[u8],
    ) -> Result<CborValue, AuthenticatorError> {
        Ok(CborValue::empty_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_statement_is_always_empty() {
        let provider = NoneAttestation::new();
        for (auth_data, hash) in [(&[][..], &[][..]), (&[1u8; 37][..], &[2u8; 32][..])] {
            let stmt = provider.statement(auth_data, hash).await.unwrap();
            assert_eq!(stmt, CborValue::empty_map());
        }
    }

    #[test]
    fn test_format_and_aaguid() {
        let provider = NoneAttestation::new();
        assert_eq!(provider.format().as_str(), "none");
        assert_eq!(provider.aaguid(), Some(Uuid::nil()));
    }
}
