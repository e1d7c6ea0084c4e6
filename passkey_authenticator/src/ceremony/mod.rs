//! Registration (attestation) and authentication (assertion) ceremonies.

mod auth_data;
mod client_data;
mod engine;
mod options;
mod request;
mod response;

pub use auth_data::{AttestedCredentialData, AuthenticatorData, flags};
pub use client_data::ClientData;
pub use engine::Authenticator;
pub use options::{
    AttestationConveyancePreference, AuthenticationExtensionsClientInputs,
    AuthenticatorSelectionCriteria, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters,
    PublicKeyCredentialRequestOptions, PublicKeyCredentialRpEntity,
    PublicKeyCredentialUserEntity, UserVerificationRequirement,
};
pub use request::{AssertionRequest, AttestationRequest};
pub use response::{
    AssertionCredential, AttestationCredential, AttestationObject, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, PublicKeyCredential,
};
