use serde::{Deserialize, Serialize};

use crate::cbor::{self, CborValue};
use crate::errors::AuthenticatorError;
use crate::keystore::CredentialId;
use crate::utils::{serde_base64url, serde_base64url_or_empty};

use super::auth_data::AuthenticatorData;
use super::client_data::ClientData;

const PUBLIC_KEY_TYPE: &str = "public-key";

/// Credential returned to the caller of a ceremony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredential<R> {
    pub id: String,
    #[serde(with = "serde_base64url")]
    pub raw_id: Vec<u8>,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: R,
}

impl<R> PublicKeyCredential<R> {
    pub(crate) fn new(credential_id: &CredentialId, response: R) -> Self {
        Self {
            id: credential_id.to_base64url(),
            raw_id: credential_id.as_bytes().to_vec(),
            type_: PUBLIC_KEY_TYPE.to_string(),
            response,
        }
    }

    pub fn credential_id(&self) -> CredentialId {
        CredentialId::from_bytes(self.raw_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON", with = "serde_base64url")]
    pub client_data_json: Vec<u8>,
    #[serde(with = "serde_base64url")]
    pub attestation_object: Vec<u8>,
}

impl AuthenticatorAttestationResponse {
    pub fn client_data(&self) -> Result<ClientData, AuthenticatorError> {
        ClientData::from_json(&self.client_data_json)
    }

    pub fn decode_attestation_object(&self) -> Result<AttestationObject, AuthenticatorError> {
        AttestationObject::from_cbor(&self.attestation_object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON", with = "serde_base64url")]
    pub client_data_json: Vec<u8>,
    #[serde(with = "serde_base64url")]
    pub authenticator_data: Vec<u8>,
    #[serde(with = "serde_base64url")]
    pub signature: Vec<u8>,
    #[serde(default, with = "serde_base64url_or_empty")]
    pub user_handle: Option<Vec<u8>>,
}

impl AuthenticatorAssertionResponse {
    pub fn client_data(&self) -> Result<ClientData, AuthenticatorError> {
        ClientData::from_json(&self.client_data_json)
    }

    pub fn parsed_authenticator_data(&self) -> Result<AuthenticatorData, AuthenticatorError> {
        AuthenticatorData::parse(&self.authenticator_data)
    }
}

pub type AttestationCredential = PublicKeyCredential<AuthenticatorAttestationResponse>;
pub type AssertionCredential = PublicKeyCredential<AuthenticatorAssertionResponse>;

/// The CBOR `attestationObject`: `{authData, fmt, attStmt}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationObject {
    pub fmt: String,
    pub auth_data: Vec<u8>,
    pub att_stmt: CborValue,
}

impl AttestationObject {
    pub fn to_cbor(&self) -> Vec<u8> {
        cbor::encode(&CborValue::text_map([
            ("authData", CborValue::Bytes(self.auth_data.clone())),
            ("fmt", CborValue::Text(self.fmt.clone())),
            ("attStmt", self.att_stmt.clone()),
        ]))
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, AuthenticatorError> {
        let value = cbor::decode_exact(bytes)?;

        let fmt = value
            .map_get_text("fmt")
            .and_then(CborValue::as_text)
            .ok_or_else(|| missing_field("fmt"))?
            .to_string();
        let auth_data = value
            .map_get_text("authData")
            .and_then(CborValue::as_bytes)
            .ok_or_else(|| missing_field("authData"))?
            .to_vec();
        let att_stmt = value
            .map_get_text("attStmt")
            .filter(|v| v.as_map().is_some())
            .ok_or_else(|| missing_field("attStmt"))?
            .clone();

        Ok(Self {
            fmt,
            auth_data,
            att_stmt,
        })
    }

    pub fn authenticator_data(&self) -> Result<AuthenticatorData, AuthenticatorError> {
        AuthenticatorData::parse(&self.auth_data)
    }
}

fn missing_field(name: &str) -> AuthenticatorError {
    AuthenticatorError::InvalidAttestationData(format!("Missing or invalid {name} in attestation object"))
}
