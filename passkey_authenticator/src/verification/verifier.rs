use std::time::Duration;

use async_trait::async_trait;

use super::types::{PromptDecision, VerificationContext, VerificationOutcome};
use crate::errors::AuthenticatorError;

/// Platform capability that verifies the user (biometrics, passcode, ...).
///
/// `timeout` is advisory for the implementation; the engine enforces it
/// independently and drops the pending future when it expires.
#[async_trait]
pub trait UserVerifier: Send + Sync {
    async fn verify(
        &self,
        reason: &str,
        timeout: Duration,
    ) -> Result<VerificationOutcome, AuthenticatorError>;

    /// Whether `prompt_interactive` can show a continue/cancel dialog.
    fn supports_interactive_prompt(&self) -> bool {
        false
    }

    async fn prompt_interactive(
        &self,
        _message: &str,
        _timeout: Duration,
    ) -> Result<PromptDecision, AuthenticatorError> {
        Err(AuthenticatorError::Verification(
            "Interactive prompts are not supported".to_string(),
        ))
    }
}

pub(crate) async fn require_user_verification(
    verifier: &dyn UserVerifier,
    reason: &str,
    timeout: Duration,
) -> Result<VerificationContext, AuthenticatorError> {
    tracing::debug!("Requesting user verification ({:?}): {}", timeout, reason);

    let outcome = match tokio::time::timeout(timeout, verifier.verify(reason, timeout)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::error!("User verification provider failed: {}", e);
            return Err(e);
        }
        Err(_) => {
            tracing::warn!("User verification did not finish within {:?}", timeout);
            return Err(AuthenticatorError::Timeout);
        }
    };

    match outcome {
        VerificationOutcome::Approved => {
            tracing::debug!("User verification approved");
            Ok(VerificationContext::new(reason))
        }
        VerificationOutcome::Denied => {
            tracing::debug!("User verification denied");
            Err(AuthenticatorError::General(
                "user verification denied".to_string(),
            ))
        }
        VerificationOutcome::TimedOut => Err(AuthenticatorError::Timeout),
    }
}

/// Shows a transaction confirmation when the verifier can. Returns `Ok(false)`
/// when the prompt was skipped.
pub(crate) async fn confirm_transaction(
    verifier: &dyn UserVerifier,
    message: &str,
    timeout: Duration,
) -> Result<bool, AuthenticatorError> {
    if !verifier.supports_interactive_prompt() {
        tracing::debug!("Verifier has no interactive prompt, skipping confirmation");
        return Ok(false);
    }

    let decision = tokio::time::timeout(timeout, verifier.prompt_interactive(message, timeout))
        .await
        .map_err(|_| AuthenticatorError::Timeout)??;

    match decision {
        PromptDecision::Continue => Ok(true),
        PromptDecision::Cancel => {
            tracing::debug!("User cancelled the confirmation prompt");
            Err(AuthenticatorError::General("cancelled".to_string()))
        }
        PromptDecision::TimedOut => Err(AuthenticatorError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{HangingVerifier, ScriptedVerifier};

    #[tokio::test]
    async fn test_approved_yields_context() {
        let verifier = ScriptedVerifier::approving();
        let ctx = require_user_verification(&verifier, "Sign in to example.com", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(ctx.reason(), "Sign in to example.com");
        assert_eq!(verifier.reasons(), vec!["Sign in to example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_denied_is_general_error() {
        let verifier = ScriptedVerifier::new(VerificationOutcome::Denied);
        let err = require_user_verification(&verifier, "r", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::General(ref m) if m == "user verification denied"));
    }

    #[tokio::test]
    async fn test_timed_out_outcome_is_timeout() {
        let verifier = ScriptedVerifier::new(VerificationOutcome::TimedOut);
        let err = require_user_verification(&verifier, "r", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Timeout));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let verifier = ScriptedVerifier::failing("sensor unavailable");
        let err = require_user_verification(&verifier, "r", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Verification(ref m) if m == "sensor unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_verifier_times_out() {
        let err = require_user_verification(&HangingVerifier, "r", Duration::from_millis(30_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Timeout));
    }

    #[tokio::test]
    async fn test_confirmation_skipped_without_prompt_support() {
        let verifier = ScriptedVerifier::approving();
        let shown = confirm_transaction(&verifier, "Pay", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!shown);
    }

    #[tokio::test]
    async fn test_confirmation_decisions() {
        let verifier = ScriptedVerifier::approving().with_prompt(PromptDecision::Continue);
        assert!(confirm_transaction(&verifier, "Pay", Duration::from_secs(1)).await.unwrap());

        let verifier = ScriptedVerifier::approving().with_prompt(PromptDecision::Cancel);
        let err = confirm_transaction(&verifier, "Pay", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::General(ref m) if m == "cancelled"));

        let verifier = ScriptedVerifier::approving().with_prompt(PromptDecision::TimedOut);
        let err = confirm_transaction(&verifier, "Pay", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticatorError::Timeout));
    }
}
