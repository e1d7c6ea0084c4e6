use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::errors::AuthenticatorError;

pub(crate) const TYPE_CREATE: &str = "webauthn.create";
pub(crate) const TYPE_GET: &str = "webauthn.get";

const RESERVED_KEYS: [&str; 3] = ["type", "challenge", "origin"];

/// Builds the origin for a relying party id, rejecting ids that are not a
/// bare host name.
pub(crate) fn origin_for_rp_id(rp_id: &str) -> Result<String, AuthenticatorError> {
    let origin = format!("https://{rp_id}");
    let url = Url::parse(&origin)
        .map_err(|e| AuthenticatorError::Configuration(format!("Invalid rpId {rp_id:?}: {e}")))?;

    if url.host_str() != Some(rp_id)
        || url.port().is_some()
        || url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(AuthenticatorError::Configuration(format!(
            "Invalid rpId {rp_id:?}: expected a lowercase host name"
        )));
    }
    Ok(origin)
}

/// Collected client data, serialized as `clientDataJSON`.
///
/// Field order is `type`, `challenge`, `origin`, then any extra members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientData {
    #[serde(rename = "type")]
    pub type_: String,
    pub challenge: String,
    pub origin: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientData {
    pub(crate) fn new(type_: &str, challenge: &str, origin: String, mut extra: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            if extra.remove(key).is_some() {
                tracing::warn!("Ignoring extra client data member {:?}", key);
            }
        }
        Self {
            type_: type_.to_string(),
            challenge: challenge.to_string(),
            origin,
            extra,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, AuthenticatorError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(json: &[u8]) -> Result<Self, AuthenticatorError> {
        Ok(serde_json::from_slice(json)?)
    }
}
