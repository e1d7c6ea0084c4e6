pub fn registration_reason(rp_id: &str, user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.is_empty() => format!("Register a passkey for {name} on {rp_id}"),
        _ => format!("Register a passkey for {rp_id}"),
    }
}

pub fn assertion_reason(rp_id: &str) -> String {
    format!("Sign in to {rp_id}")
}

pub fn transaction_prompt(rp_id: &str, text: &str) -> String {
    format!("{rp_id} asks you to confirm:\n\n{text}")
}
