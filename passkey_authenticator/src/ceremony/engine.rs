use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::attestation::AttestationFormat;
use crate::cbor::CborValue;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthenticatorConfig;
use crate::cose::{COSE_ALG_ES256, CoseKeyEc2};
use crate::errors::AuthenticatorError;
use crate::keystore::{CredentialId, CredentialKey, KeyHandle, KeyStore};
use crate::utils::sha256;
use crate::verification::{
    UserVerifier, VerificationContext, assertion_reason, confirm_transaction, registration_reason,
    require_user_verification, transaction_prompt,
};

use super::auth_data::{AttestedCredentialData, AuthenticatorData, flags};
use super::client_data::{ClientData, TYPE_CREATE, TYPE_GET, origin_for_rp_id};
use super::options::{AttestationConveyancePreference, UserVerificationRequirement};
use super::request::{AssertionRequest, AttestationRequest};
use super::response::{
    AssertionCredential, AttestationCredential, AttestationObject,
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, PublicKeyCredential,
};

/// Runs registration and authentication ceremonies against a key store.
///
/// Each call runs to completion on its own; the only shared state is the key
/// store. Keys generated before a later step fails stay in the store.
pub struct Authenticator {
    key_store: Arc<dyn KeyStore>,
    verifier: Arc<dyn UserVerifier>,
    clock: Arc<dyn Clock>,
    config: AuthenticatorConfig,
}

impl Authenticator {
    pub fn new(key_store: Arc<dyn KeyStore>, verifier: Arc<dyn UserVerifier>) -> Self {
        Self {
            key_store,
            verifier,
            clock: Arc::new(SystemClock),
            config: AuthenticatorConfig::from_env(),
        }
    }

    pub fn with_config(mut self, config: AuthenticatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.config.verification_timeout = timeout;
        self
    }

    pub fn config(&self) -> &AuthenticatorConfig {
        &self.config
    }

    /// Registration: creates a credential and returns its attestation.
    pub async fn create_credential(
        &self,
        request: AttestationRequest,
    ) -> Result<AttestationCredential, AuthenticatorError> {
        let AttestationRequest {
            rp_id,
            user_handle,
            user_name,
            challenge,
            attestation,
            mut provider,
            aaguid,
            user_verification,
            exclude_credentials,
            timeout,
        } = request;

        let origin = origin_for_rp_id(&rp_id)?;
        check_conveyance(attestation, provider.format())?;

        if user_verification == UserVerificationRequirement::Discouraged {
            return Err(AuthenticatorError::Configuration(
                "User verification is always performed; 'discouraged' is not supported"
                    .to_string(),
            ));
        }

        for id in &exclude_credentials {
            if self.key_store.lookup(id, None).await?.is_some() {
                tracing::debug!("Excluded credential {} is present", id);
                return Err(AuthenticatorError::General(
                    "A credential in excludeCredentials already exists on this authenticator"
                        .to_string(),
                ));
            }
        }

        tracing::debug!(
            "Creating credential: rp_id={}, user_handle_len={}, attestation={:?}, format={}",
            rp_id,
            user_handle.len(),
            attestation,
            provider.format()
        );

        let timeout = timeout.unwrap_or(self.config.verification_timeout);
        let reason = registration_reason(&rp_id, user_name.as_deref());
        let ctx = require_user_verification(self.verifier.as_ref(), &reason, timeout).await?;

        let (credential_id, handle, public_key) = self.generate_credential_key(&ctx).await?;

        let client_data_json =
            ClientData::new(TYPE_CREATE, &challenge, origin, Default::default()).to_json()?;
        let client_data_hash = sha256(&client_data_json);

        let direct = attestation == AttestationConveyancePreference::Direct;
        // A "none" attestation carries the all-zero AAGUID.
        let aaguid = if direct {
            aaguid
                .or_else(|| provider.aaguid())
                .unwrap_or(self.config.aaguid)
        } else {
            Uuid::nil()
        };
        let attested = AttestedCredentialData::new(
            aaguid,
            credential_id.as_bytes().to_vec(),
            public_key,
        )?;
        let auth_data = AuthenticatorData::new(&rp_id, flags::UP | flags::UV, self.clock.counter())
            .with_attested_credential_data(attested)
            .to_bytes();
        tracing::debug!("Built authenticator data ({} bytes)", auth_data.len());

        let (fmt, att_stmt) = if direct {
            provider.bind_credential_key(CredentialKey::new(self.key_store.clone(), handle));
            let stmt = provider.statement(&auth_data, &client_data_hash).await?;
            (provider.format(), stmt)
        } else {
            (AttestationFormat::None, CborValue::empty_map())
        };
        tracing::debug!("Attestation format: {}", fmt);

        let attestation_object = AttestationObject {
            fmt: fmt.as_str().to_string(),
            auth_data,
            att_stmt,
        }
        .to_cbor();

        tracing::info!("Created credential {} for {}", credential_id, rp_id);
        Ok(PublicKeyCredential::new(
            &credential_id,
            AuthenticatorAttestationResponse {
                client_data_json,
                attestation_object,
            },
        ))
    }

    /// Authentication: signs a challenge with a previously registered credential.
    pub async fn get_assertion(
        &self,
        request: AssertionRequest,
    ) -> Result<AssertionCredential, AuthenticatorError> {
        let origin = origin_for_rp_id(&request.rp_id)?;
        let timeout = request.timeout.unwrap_or(self.config.verification_timeout);

        tracing::debug!(
            "Getting assertion: rp_id={}, allow_credentials={}, user_verification={:?}",
            request.rp_id,
            request.allow_credentials.len(),
            request.user_verification
        );

        let credential_id = self.find_credential(&request.allow_credentials).await?;

        let reason = assertion_reason(&request.rp_id);
        let ctx = require_user_verification(self.verifier.as_ref(), &reason, timeout).await?;

        let handle = self
            .key_store
            .lookup(&credential_id, Some(&ctx))
            .await?
            .ok_or_else(|| {
                AuthenticatorError::InvalidPrivateKeyData(format!(
                    "Key for credential {} is no longer available",
                    credential_id
                ))
            })?;

        let tx_auth_simple = request
            .extensions
            .as_ref()
            .and_then(|e| e.tx_auth_simple.as_deref());
        if let Some(text) = tx_auth_simple {
            let message = transaction_prompt(&request.rp_id, text);
            confirm_transaction(self.verifier.as_ref(), &message, timeout).await?;
        }

        let client_data_json = ClientData::new(
            TYPE_GET,
            &request.challenge,
            origin,
            request.extra_client_data.clone(),
        )
        .to_json()?;
        let client_data_hash = sha256(&client_data_json);

        let mut auth_data =
            AuthenticatorData::new(&request.rp_id, flags::UP | flags::UV, self.clock.counter());
        if let Some(text) = tx_auth_simple {
            auth_data = auth_data
                .with_extensions(CborValue::text_map([("txAuthSimple", CborValue::from(text))]));
        }
        let authenticator_data = auth_data.to_bytes();

        let mut signature_base = authenticator_data.clone();
        signature_base.extend_from_slice(&client_data_hash);
        let signature = self
            .key_store
            .sign(&handle, &signature_base)
            .await
            .inspect_err(|e| tracing::error!("Signing failed for {}: {}", credential_id, e))?;

        tracing::info!("Created assertion with credential {}", credential_id);
        Ok(PublicKeyCredential::new(
            &credential_id,
            AuthenticatorAssertionResponse {
                client_data_json,
                authenticator_data,
                signature,
                user_handle: None,
            },
        ))
    }

    async fn generate_credential_key(
        &self,
        ctx: &VerificationContext,
    ) -> Result<(CredentialId, KeyHandle, CoseKeyEc2), AuthenticatorError> {
        let (public_key_der, handle) = self
            .key_store
            .generate(ctx)
            .await
            .inspect_err(|e| tracing::error!("Key generation failed: {}", e))?;

        let credential_id = CredentialId::from_public_key_der(&public_key_der);
        self.key_store.bind(&credential_id, &handle).await?;

        let public_key = CoseKeyEc2::from_public_key_der(&public_key_der, COSE_ALG_ES256)?;
        Ok((credential_id, handle, public_key))
    }

    /// First allowed credential the store can resolve, checked before the user
    /// is prompted.
    async fn find_credential(
        &self,
        allow_credentials: &[CredentialId],
    ) -> Result<CredentialId, AuthenticatorError> {
        for id in allow_credentials {
            if self.key_store.lookup(id, None).await?.is_some() {
                tracing::debug!("Found key for credential {}", id);
                return Ok(id.clone());
            }
        }
        tracing::debug!("None of {} allowed credentials resolved", allow_credentials.len());
        Err(AuthenticatorError::InvalidPrivateKeyData(
            "No private key found for the allowed credentials".to_string(),
        ))
    }
}

/// `indirect` and `enterprise` cannot be honoured, nor `direct` with a
/// provider that produces no statement.
fn check_conveyance(
    preference: AttestationConveyancePreference,
    format: AttestationFormat,
) -> Result<(), AuthenticatorError> {
    match (preference, format) {
        (AttestationConveyancePreference::Indirect | AttestationConveyancePreference::Enterprise, _) => {
            Err(AuthenticatorError::Configuration(format!(
                "Attestation conveyance {:?} is not supported",
                preference
            )))
        }
        (AttestationConveyancePreference::Direct, AttestationFormat::None) => {
            Err(AuthenticatorError::Configuration(
                "Direct attestation requested but the provider produces no statement".to_string(),
            ))
        }
        _ => Ok(()),
    }
}
