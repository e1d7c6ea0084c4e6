use crate::errors::AuthenticatorError;

/// Rejects absent (empty) inputs and returns the signature base.
pub(super) fn signature_base(
    auth_data: &[u8],
    client_data_hash: &[u8],
) -> Result<Vec<u8>, AuthenticatorError> {
    if auth_data.is_empty() {
        return Err(AuthenticatorError::InvalidAttestationData(
            "Missing authenticator data".to_string(),
        ));
    }
    if client_data_hash.is_empty() {
        return Err(AuthenticatorError::InvalidAttestationData(
            "Missing client data hash".to_string(),
        ));
    }

    let mut base = Vec::with_capacity(auth_data.len() + client_data_hash.len());
    base.extend_from_slice(auth_data);
    base.extend_from_slice(client_data_hash);
    Ok(base)
}

/// Strips PEM armour, leaving the base64 body.
pub(super) fn pem_body(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect()
}
