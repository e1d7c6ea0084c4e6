//! User verification boundary: the platform prompt the engine waits on.

mod prompt;
mod types;
mod verifier;

pub use prompt::{assertion_reason, registration_reason, transaction_prompt};
pub use types::{PromptDecision, VerificationContext, VerificationOutcome};
pub use verifier::UserVerifier;

pub(crate) use verifier::{confirm_transaction, require_user_verification};
