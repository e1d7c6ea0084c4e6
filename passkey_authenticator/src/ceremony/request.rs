use std::time::Duration;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::attestation::AttestationProvider;
use crate::cose::COSE_ALG_ES256;
use crate::errors::AuthenticatorError;
use crate::keystore::CredentialId;

use super::options::{
    AttestationConveyancePreference, AuthenticationExtensionsClientInputs,
    PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    UserVerificationRequirement,
};

/// Input to [`Authenticator::create_credential`](super::Authenticator::create_credential).
pub struct AttestationRequest {
    pub rp_id: String,
    pub user_handle: Vec<u8>,
    pub user_name: Option<String>,
    pub challenge: String,
    pub attestation: AttestationConveyancePreference,
    pub provider: Box<dyn AttestationProvider>,
    /// Overrides both the provider's and the configured AAGUID.
    pub aaguid: Option<Uuid>,
    pub user_verification: UserVerificationRequirement,
    pub exclude_credentials: Vec<CredentialId>,
    /// Overrides the configured verification timeout.
    pub timeout: Option<Duration>,
}

impl AttestationRequest {
    pub fn new(
        rp_id: impl Into<String>,
        user_handle: impl Into<Vec<u8>>,
        challenge: impl Into<String>,
        provider: Box<dyn AttestationProvider>,
    ) -> Self {
        Self {
            rp_id: rp_id.into(),
            user_handle: user_handle.into(),
            user_name: None,
            challenge: challenge.into(),
            attestation: AttestationConveyancePreference::None,
            provider,
            aaguid: None,
            user_verification: UserVerificationRequirement::Required,
            exclude_credentials: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_attestation(mut self, attestation: AttestationConveyancePreference) -> Self {
        self.attestation = attestation;
        self
    }

    pub fn with_user_verification(mut self, requirement: UserVerificationRequirement) -> Self {
        self.user_verification = requirement;
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_aaguid(mut self, aaguid: Uuid) -> Self {
        self.aaguid = Some(aaguid);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_creation_options(
        options: &PublicKeyCredentialCreationOptions,
        provider: Box<dyn AttestationProvider>,
    ) -> Result<Self, AuthenticatorError> {
        let rp_id = options.rp.id.clone().ok_or_else(|| {
            AuthenticatorError::Configuration("Creation options carry no rp.id".to_string())
        })?;

        if !options
            .pub_key_cred_params
            .iter()
            .any(|p| p.type_ == "public-key" && p.alg == COSE_ALG_ES256)
        {
            return Err(AuthenticatorError::Configuration(
                "No supported algorithm in pubKeyCredParams (ES256 required)".to_string(),
            ));
        }

        let user_verification = options
            .authenticator_selection
            .as_ref()
            .map(|s| s.user_verification)
            .unwrap_or_default();

        tracing::debug!(
            "Creation options: rp_id={}, attestation={:?}, user_verification={:?}",
            rp_id,
            options.attestation,
            user_verification
        );

        Ok(Self {
            rp_id,
            user_handle: options.user.id.clone(),
            user_name: Some(options.user.name.clone()),
            challenge: options.challenge.clone(),
            attestation: options.attestation,
            provider,
            aaguid: None,
            user_verification,
            exclude_credentials: options
                .exclude_credentials
                .iter()
                .map(|d| CredentialId::from_bytes(d.id.clone()))
                .collect(),
            timeout: options.timeout.map(Duration::from_millis),
        })
    }
}

impl std::fmt::Debug for AttestationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationRequest")
            .field("rp_id", &self.rp_id)
            .field("challenge", &self.challenge)
            .field("attestation", &self.attestation)
            .field("format", &self.provider.format())
            .field("user_verification", &self.user_verification)
            .finish_non_exhaustive()
    }
}

/// Input to [`Authenticator::get_assertion`](super::Authenticator::get_assertion).
#[derive(Debug, Clone)]
pub struct AssertionRequest {
    pub rp_id: String,
    pub challenge: String,
    pub allow_credentials: Vec<CredentialId>,
    pub user_verification: UserVerificationRequirement,
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
    /// Extra members appended to the client data JSON.
    pub extra_client_data: Map<String, Value>,
    pub timeout: Option<Duration>,
}

impl AssertionRequest {
    pub fn new(
        rp_id: impl Into<String>,
        challenge: impl Into<String>,
        allow_credentials: Vec<CredentialId>,
    ) -> Self {
        Self {
            rp_id: rp_id.into(),
            challenge: challenge.into(),
            allow_credentials,
            user_verification: UserVerificationRequirement::Required,
            extensions: None,
            extra_client_data: Map::new(),
            timeout: None,
        }
    }

    pub fn with_extensions(mut self, extensions: AuthenticationExtensionsClientInputs) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn with_tx_auth_simple(self, text: impl Into<String>) -> Self {
        self.with_extensions(AuthenticationExtensionsClientInputs {
            tx_auth_simple: Some(text.into()),
        })
    }

    pub fn with_extra_client_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_client_data.insert(key.into(), value);
        self
    }

    pub fn with_user_verification(mut self, requirement: UserVerificationRequirement) -> Self {
        self.user_verification = requirement;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_request_options(options: &PublicKeyCredentialRequestOptions) -> Self {
        Self {
            rp_id: options.rp_id.clone(),
            challenge: options.challenge.clone(),
            allow_credentials: options
                .allow_credentials
                .iter()
                .map(|d| CredentialId::from_bytes(d.id.clone()))
                .collect(),
            user_verification: options.user_verification,
            extensions: options.extensions.clone(),
            extra_client_data: Map::new(),
            timeout: options.timeout.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::NoneAttestation;
    use serde_json::json;

    fn creation_options(params: Value) -> PublicKeyCredentialCreationOptions {
        serde_json::from_value(json!({
            "rp": {"id": "example.com", "name": "Example"},
            "user": {"id": "dXNlci0x", "name": "alice", "displayName": "Alice"},
            "challenge": "Y2hhbGxlbmdl",
            "pubKeyCredParams": params,
            "timeout": 5000,
            "excludeCredentials": [{"type": "public-key", "id": "AQID"}],
            "authenticatorSelection": {"userVerification": "discouraged"},
            "attestation": "indirect"
        }))
        .unwrap()
    }

    #[test]
    fn test_from_creation_options() {
        let options = creation_options(json!([{"type": "public-key", "alg": -7}]));
        let request =
            AttestationRequest::from_creation_options(&options, Box::new(NoneAttestation)).unwrap();

        assert_eq!(request.rp_id, "example.com");
        assert_eq!(request.user_handle, b"user-1".to_vec());
        assert_eq!(request.user_name.as_deref(), Some("alice"));
        assert_eq!(request.challenge, "Y2hhbGxlbmdl");
        assert_eq!(request.attestation, AttestationConveyancePreference::Indirect);
        assert_eq!(request.user_verification, UserVerificationRequirement::Discouraged);
        assert_eq!(request.timeout, Some(Duration::from_millis(5000)));
        assert_eq!(request.exclude_credentials, vec![CredentialId::from_bytes(vec![1, 2, 3])]);
    }

    #[test]
    fn test_from_creation_options_requires_es256() {
        let options = creation_options(json!([{"type": "public-key", "alg": -257}]));
        let err = AttestationRequest::from_creation_options(&options, Box::new(NoneAttestation))
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Configuration(_)));
    }

    #[test]
    fn test_from_creation_options_requires_rp_id() {
        let mut options = creation_options(json!([{"type": "public-key", "alg": -7}]));
        options.rp.id = None;
        let err = AttestationRequest::from_creation_options(&options, Box::new(NoneAttestation))
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Configuration(_)));
    }

    #[test]
    fn test_from_request_options() {
        let options: PublicKeyCredentialRequestOptions = serde_json::from_value(json!({
            "challenge": "abc",
            "rpId": "example.com",
            "timeout": 1000,
            "allowCredentials": [{"type": "public-key", "id": "AQID"}, {"type": "public-key", "id": "BAU"}],
            "userVerification": "required",
            "extensions": {"txAuthSimple": "Pay"}
        }))
        .unwrap();
        let request = AssertionRequest::from_request_options(&options);

        assert_eq!(request.allow_credentials.len(), 2);
        assert_eq!(request.allow_credentials[1].as_bytes(), &[4, 5]);
        assert_eq!(request.timeout, Some(Duration::from_millis(1000)));
        assert_eq!(
            request.extensions.and_then(|e| e.tx_auth_simple).as_deref(),
            Some("Pay")
        );
    }

    #[test]
    fn test_builders() {
        let request = AssertionRequest::new("example.com", "c", vec![])
            .with_tx_auth_simple("Pay")
            .with_extra_client_data("crossOrigin", json!(false))
            .with_timeout(Duration::from_secs(3));
        assert_eq!(request.extra_client_data.get("crossOrigin"), Some(&json!(false)));
        assert!(!request.extensions.as_ref().unwrap().is_empty());

        let request = AttestationRequest::new("example.com", b"u".to_vec(), "c", Box::new(NoneAttestation))
            .with_attestation(AttestationConveyancePreference::Direct)
            .with_user_name("alice")
            .with_aaguid(Uuid::nil());
        assert_eq!(request.user_verification, UserVerificationRequirement::Required);
        assert!(format!("{request:?}").contains("None"));
    }
}
