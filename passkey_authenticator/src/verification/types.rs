/// Result of asking the platform to verify the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Approved,
    Denied,
    TimedOut,
}

/// Answer to an interactive confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    Continue,
    Cancel,
    TimedOut,
}

/// Proof that user verification succeeded for one ceremony.
///
/// Only the ceremony engine creates these, after a verifier approved the
/// request. Key stores take one on `generate` and `lookup`, so keys cannot be
/// created or unlocked without a completed verification.
#[derive(Debug)]
pub struct VerificationContext {
    reason: String,
}

impl VerificationContext {
    pub(crate) fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }

    /// The prompt text the user approved.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Construct a proof for use in tests only.
    /// Do not use in production code, this bypasses user verification.
    #[doc(hidden)]
    pub fn test_only() -> Self {
        Self::new("test")
    }
}
