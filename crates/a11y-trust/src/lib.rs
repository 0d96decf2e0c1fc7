#![warn(missing_docs)]

//! Trust decisions for assistive services.
//!
//! Given the platform's list of enabled assistive services and access to their
//! signing certificates, [`TrustPolicy`] decides whether accessibility traffic
//! may flow. Exactly one outcome results from every evaluation:
//!
//! - no service enabled: [`Decision::Allow`]
//! - more than one service enabled: [`Decision::Block`]
//! - one service, not the [`TrustedIdentity`]: [`Decision::Block`]
//! - one trusted service whose certificate cannot be read, or hashes to the
//!   wrong SHA-256 digest: [`Decision::Block`]
//! - one trusted service with a matching digest: [`Decision::Allow`]
//!
//! An unreadable or absent registry blocks. The [`Evaluator`] binds a policy to
//! live [`ServiceRegistry`] and [`CertificateStore`] handles and re-reads both
//! on every call.

pub mod digest;
mod error;
pub mod identity;
pub mod policy;
pub mod registry;
pub mod test_support;

pub use digest::CertificateDigest;
pub use error::Error;
pub use identity::TrustedIdentity;
pub use policy::{Decision, Evaluator, Reason, TrustPolicy, Verdict};
pub use registry::{
    ActiveServiceRecord, CertificateRef, CertificateStore, RegistryError, ServiceRegistry,
};
