//! Attestation statement providers: `none`, packed self and packed basic (x5c).

mod basic;
mod none;
mod self_signed;
mod types;
mod utils;

pub use basic::BasicAttestation;
pub use none::NoneAttestation;
pub use self_signed::SelfAttestation;
pub use types::{AttestationFormat, AttestationProvider};
