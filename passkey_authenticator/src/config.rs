use std::{env, sync::LazyLock, time::Duration};

use uuid::Uuid;

const DEFAULT_VERIFICATION_TIMEOUT_MS: u64 = 30_000;

/// Default user-verification timeout, `PASSKEY_VERIFICATION_TIMEOUT` in milliseconds.
pub static PASSKEY_VERIFICATION_TIMEOUT: LazyLock<Duration> =
    LazyLock::new(read_verification_timeout);

/// AAGUID for `direct` attestation when neither request nor provider supplies one.
pub static PASSKEY_AUTHENTICATOR_AAGUID: LazyLock<Uuid> = LazyLock::new(read_aaguid);

fn read_verification_timeout() -> Duration {
    let millis = match env::var("PASSKEY_VERIFICATION_TIMEOUT").ok() {
        None => DEFAULT_VERIFICATION_TIMEOUT_MS,
        Some(v) => match v.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                tracing::warn!(
                    "Invalid verification timeout: {}. Using default {}ms",
                    v,
                    DEFAULT_VERIFICATION_TIMEOUT_MS
                );
                DEFAULT_VERIFICATION_TIMEOUT_MS
            }
        },
    };
    Duration::from_millis(millis)
}

fn read_aaguid() -> Uuid {
    env::var("PASSKEY_AUTHENTICATOR_AAGUID").map_or(Uuid::nil(), |v| {
        Uuid::parse_str(v.trim()).unwrap_or_else(|e| {
            tracing::warn!("Invalid authenticator AAGUID: {} ({}). Using all-zero AAGUID", v, e);
            Uuid::nil()
        })
    })
}

/// Engine settings that are not part of an individual request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorConfig {
    pub verification_timeout: Duration,
    pub aaguid: Uuid,
}

impl AuthenticatorConfig {
    pub fn from_env() -> Self {
        Self {
            verification_timeout: *PASSKEY_VERIFICATION_TIMEOUT,
            aaguid: *PASSKEY_AUTHENTICATOR_AAGUID,
        }
    }
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
