use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use passkey_authenticator::{
    AssertionRequest, AttestationConveyancePreference, AttestationRequest, Authenticator,
    AuthenticatorConfig, AuthenticatorError, MemoryKeyStore, NoneAttestation, PromptDecision,
    SelfAttestation, UserVerifier, VerificationOutcome, gen_random_string,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RP_ID: &str = "example.com";

/// Stands in for a biometric prompt by approving every request.
struct AutoApproveVerifier;

#[async_trait]
impl UserVerifier for AutoApproveVerifier {
    async fn verify(
        &self,
        reason: &str,
        timeout: Duration,
    ) -> Result<VerificationOutcome, AuthenticatorError> {
        tracing::info!("[verifier] {} (timeout {:?}): approved", reason, timeout);
        Ok(VerificationOutcome::Approved)
    }

    fn supports_interactive_prompt(&self) -> bool {
        true
    }

    async fn prompt_interactive(
        &self,
        message: &str,
        _timeout: Duration,
    ) -> Result<PromptDecision, AuthenticatorError> {
        tracing::info!("[verifier] confirm: {:?}: continue", message);
        Ok(PromptDecision::Continue)
    }
}

fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("passkey_authenticator=debug,{}=debug,info", app_name).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_authenticator");

    let config = AuthenticatorConfig::from_env();
    tracing::info!(
        "Verification timeout {:?}, AAGUID {}",
        config.verification_timeout,
        config.aaguid
    );

    let authenticator = Authenticator::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(AutoApproveVerifier),
    )
    .with_config(config);

    let registered = authenticator
        .create_credential(
            AttestationRequest::new(
                RP_ID,
                b"demo-user".to_vec(),
                gen_random_string(32)?,
                Box::new(NoneAttestation::new()),
            )
            .with_user_name("demo"),
        )
        .await?;
    println!(
        "Registration (none attestation):\n{}\n",
        serde_json::to_string_pretty(&registered)?
    );

    let self_attested = authenticator
        .create_credential(
            AttestationRequest::new(
                RP_ID,
                b"demo-user".to_vec(),
                gen_random_string(32)?,
                Box::new(SelfAttestation::new()),
            )
            .with_attestation(AttestationConveyancePreference::Direct)
            .with_user_name("demo"),
        )
        .await?;
    println!(
        "Registration (packed self attestation):\n{}\n",
        serde_json::to_string_pretty(&self_attested)?
    );

    let assertion = authenticator
        .get_assertion(
            AssertionRequest::new(RP_ID, gen_random_string(32)?, vec![registered.credential_id()])
                .with_tx_auth_simple("Sign in to the demo"),
        )
        .await?;
    println!(
        "Authentication:\n{}",
        serde_json::to_string_pretty(&assertion)?
    );

    Ok(())
}
