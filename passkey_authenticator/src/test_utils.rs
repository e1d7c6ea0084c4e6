//! Shared fixtures for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::errors::AuthenticatorError;
use crate::keystore::p256_public_key_der;
use crate::verification::{PromptDecision, UserVerifier, VerificationOutcome};

/// P-256 attestation key (PKCS#8, base64) matching [`TEST_CERT_PEM`].
pub(crate) const TEST_PKCS8_B64: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgwJgKlyMEOAx9ZTKUNGOk6hc7W/AAhAjYsvvitVgvnjShRANCAAQAZXHqlQRjbUYobHoNteLPFndmKaItJXzdQk53r8+H8/0wJjKqZZ+LpwTDT6fjBr2FP2KLuADIvZIsKFU/WFEa";

/// Self-signed certificate for [`TEST_PKCS8_B64`], valid until 2126.
pub(crate) const TEST_CERT_PEM: &str = "-----BEGIN CERTIFICATE-----
MIICXzCCAgWgAwIBAgIUC7KbI6aKiMXl4Gi7MZCWRc3PZGYwCgYIKoZIzj0EAwIw
gYMxCzAJBgNVBAYTAlVTMR4wHAYDVQQKDBVQYXNza2V5IEF1dGhlbnRpY2F0b3Ix
IjAgBgNVBAsMGUF1dGhlbnRpY2F0b3IgQXR0ZXN0YXRpb24xMDAuBgNVBAMMJ1Bh
c3NrZXkgQXV0aGVudGljYXRvciBCYXNpYyBBdHRlc3RhdGlvbjAgFw0yNjEwMTYx
MzE4NDBaGA8yMTI2MDkyMjEzMTg0MFowgYMxCzAJBgNVBAYTAlVTMR4wHAYDVQQK
DBVQYXNza2V5IEF1dGhlbnRpY2F0b3IxIjAgBgNVBAsMGUF1dGhlbnRpY2F0b3Ig
QXR0ZXN0YXRpb24xMDAuBgNVBAMMJ1Bhc3NrZXkgQXV0aGVudGljYXRvciBCYXNp
YyBBdHRlc3RhdGlvbjBZMBMGByqGSM49AgEGCCqGSM49AwEHA0IABABlceqVBGNt
Rihseg214s8Wd2Ypoi0lfN1CTnevz4fz/TAmMqpln4unBMNPp+MGvYU/You4AMi9
kiwoVT9YURqjUzBRMB0GA1UdDgQWBBTkn0mu4Kkezq919YDOInnIhSuEbzAfBgNV
HSMEGDAWgBTkn0mu4Kkezq919YDOInnIhSuEbzAPBgNVHRMBAf8EBTADAQH/MAoG
CCqGSM49BAMCA0gAMEUCIQCSZMwjfM42qKlQS3riN6i6/HrCrTlul6RJN12qCeFl
jwIgazdqpnfd4R3nS69vKTIpxwb/fLTuhf7vvv+L5WgpvmE=
-----END CERTIFICATE-----
";

/// Uncompressed public point of [`TEST_PKCS8_B64`].
pub(crate) const TEST_PUBLIC_POINT: [u8; 65] = [
    0x04, 0x00, 0x65, 0x71, 0xea, 0x95, 0x04, 0x63, 0x6d, 0x46, 0x28, 0x6c, 0x7a,
    0x0d, 0xb5, 0xe2, 0xcf, 0x16, 0x77, 0x66, 0x29, 0xa2, 0x2d, 0x25, 0x7c, 0xdd,
    0x42, 0x4e, 0x77, 0xaf, 0xcf, 0x87, 0xf3, 0xfd, 0x30, 0x26, 0x32, 0xaa, 0x65,
    0x9f, 0x8b, 0xa7, 0x04, 0xc3, 0x4f, 0xa7, 0xe3, 0x06, 0xbd, 0x85, 0x3f, 0x62,
    0x8b, 0xb8, 0x00, 0xc8, 0xbd, 0x92, 0x2c, 0x28, 0x55, 0x3f, 0x58, 0x51, 0x1a,
];

pub(crate) fn test_pkcs8() -> Vec<u8> {
    STANDARD.decode(TEST_PKCS8_B64).expect("valid test key")
}

pub(crate) fn test_public_key_der() -> Vec<u8> {
    p256_public_key_der(&TEST_PUBLIC_POINT)
}

/// Verifier that answers with fixed outcomes and records what it was asked.
pub(crate) struct ScriptedVerifier {
    outcome: VerificationOutcome,
    error: Option<String>,
    prompt: Option<PromptDecision>,
    reasons: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedVerifier {
    pub(crate) fn new(outcome: VerificationOutcome) -> Self {
        Self {
            outcome,
            error: None,
            prompt: None,
            reasons: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn approving() -> Self {
        Self::new(VerificationOutcome::Approved)
    }

    pub(crate) fn failing(message: &str) -> Self {
        let mut verifier = Self::approving();
        verifier.error = Some(message.to_string());
        verifier
    }

    /// Enables interactive prompts, answering each with `decision`.
    pub(crate) fn with_prompt(mut self, decision: PromptDecision) -> Self {
        self.prompt = Some(decision);
        self
    }

    pub(crate) fn reasons(&self) -> Vec<String> {
        self.reasons.lock().unwrap().clone()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserVerifier for ScriptedVerifier {
    async fn verify(
        &self,
        reason: &str,
        _timeout: Duration,
    ) -> Result<VerificationOutcome, AuthenticatorError> {
        self.reasons.lock().unwrap().push(reason.to_string());
        match &self.error {
            Some(message) => Err(AuthenticatorError::Verification(message.clone())),
            None => Ok(self.outcome),
        }
    }

    fn supports_interactive_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    async fn prompt_interactive(
        &self,
        message: &str,
        _timeout: Duration,
    ) -> Result<PromptDecision, AuthenticatorError> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.prompt.ok_or_else(|| AuthenticatorError::Verification("no prompt".to_string()))
    }
}

/// Verifier whose prompt never returns.
pub(crate) struct HangingVerifier;

#[async_trait]
impl UserVerifier for HangingVerifier {
    async fn verify(
        &self,
        _reason: &str,
        _timeout: Duration,
    ) -> Result<VerificationOutcome, AuthenticatorError> {
        std::future::pending().await
    }
}
