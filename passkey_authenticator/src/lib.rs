//! passkey-authenticator - client-side WebAuthn/FIDO2 authenticator
//!
//! Turns relying-party creation and request options into signed credential
//! responses. The crate carries its own CBOR codec and COSE key encoder,
//! `none` and `packed` (self and basic) attestation, and the ceremony engine.
//! Key storage and user verification are platform concerns and are injected
//! through the [`KeyStore`] and [`UserVerifier`] traits.

mod attestation;
mod ceremony;
mod clock;
mod config;
mod cose;
mod errors;
mod keystore;
mod utils;
mod verification;

pub mod cbor;

#[cfg(test)]
mod test_utils;

pub use attestation::{
    AttestationFormat, AttestationProvider, BasicAttestation, NoneAttestation, SelfAttestation,
};
pub use ceremony::{
    AssertionCredential, AssertionRequest, AttestationConveyancePreference, AttestationCredential,
    AttestationObject, AttestationRequest, AttestedCredentialData,
    AuthenticationExtensionsClientInputs, Authenticator, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, AuthenticatorData, AuthenticatorSelectionCriteria,
    ClientData, PublicKeyCredential, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters,
    PublicKeyCredentialRequestOptions, PublicKeyCredentialRpEntity,
    PublicKeyCredentialUserEntity, UserVerificationRequirement, flags,
};
pub use cbor::{CborError, CborValue};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AuthenticatorConfig, PASSKEY_AUTHENTICATOR_AAGUID, PASSKEY_VERIFICATION_TIMEOUT};
pub use cose::{COSE_ALG_ES256, COSE_CRV_P256, COSE_KTY_EC2, CoseKeyEc2};
pub use errors::AuthenticatorError;
pub use keystore::{CredentialId, CredentialKey, KeyHandle, KeyStore, MemoryKeyStore};
pub use utils::{UtilError, base64url_decode, base64url_encode, gen_random_string};
pub use verification::{
    PromptDecision, UserVerifier, VerificationContext, VerificationOutcome, assertion_reason,
    registration_reason, transaction_prompt,
};
