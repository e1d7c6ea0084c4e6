//! Key store boundary and the in-process software implementation.

mod memory;
mod types;

pub use memory::MemoryKeyStore;
pub use types::{CredentialId, CredentialKey, KeyHandle, KeyStore};

#[cfg(test)]
pub(crate) use memory::p256_public_key_der;
