use thiserror::Error;

use crate::cbor::CborError;
use crate::utils::UtilError;

/// Errors that can occur while running an authenticator ceremony.
///
/// Every failure is surfaced to the caller as one of these variants. The
/// ceremony engine never recovers from an error on its own, and it never
/// substitutes a weaker attestation for the one that was requested.
#[derive(Debug, Error)]
pub enum AuthenticatorError {
    /// The authenticator data or client data hash given to an attestation
    /// statement provider was missing or malformed
    #[error("Invalid attestation data: {0}")]
    InvalidAttestationData(String),

    /// No usable private key: nothing bound, malformed key bytes, or no
    /// allowed credential resolved in the key store
    #[error("Invalid private key data: {0}")]
    InvalidPrivateKeyData(String),

    /// The attestation certificate could not be decoded or parsed
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The crypto provider rejected well-formed key bytes
    #[error("Unable to create key: {0}")]
    UnableToCreateKey(String),

    /// The crypto provider failed to produce a signature
    #[error("Unable to create signature: {0}")]
    UnableToCreateSignature(String),

    /// User verification or an interactive prompt did not finish in time
    #[error("Operation timed out")]
    Timeout,

    /// General error not covered by other categories
    #[error("{0}")]
    General(String),

    /// Malformed or truncated CBOR input
    #[error("CBOR decode error: {0}")]
    Decode(#[from] CborError),

    /// The request combines options this authenticator cannot honor
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The key store backend failed
    #[error("Key store error: {0}")]
    KeyStore(String),

    /// The user verification provider failed
    #[error("Verification error: {0}")]
    Verification(String),

    /// Error from utility operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from JSON serialization/deserialization
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthenticatorError::Timeout.to_string(), "Operation timed out");
        assert_eq!(
            AuthenticatorError::General("cancelled".to_string()).to_string(),
            "cancelled"
        );
        assert_eq!(
            AuthenticatorError::Configuration("bad".to_string()).to_string(),
            "Configuration error: bad"
        );
    }

    #[test]
    fn test_cbor_error_converts_to_decode() {
        let err: AuthenticatorError = CborError::MixedMapKeys.into();
        assert!(matches!(err, AuthenticatorError::Decode(CborError::MixedMapKeys)));
        assert!(err.to_string().starts_with("CBOR decode error"));
    }

    #[test]
    fn test_util_error_converts() {
        let err: AuthenticatorError = UtilError::Format("oops".to_string()).into();
        assert!(matches!(err, AuthenticatorError::Utils(UtilError::Format(_))));
    }
}
