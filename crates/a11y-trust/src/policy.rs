//! Single-service, verified-identity trust policy.
//!
//! The policy admits accessibility traffic only when either no assistive
//! service is enabled, or exactly one is enabled and it is the configured
//! [`TrustedIdentity`] with a matching signing-certificate digest. Everything
//! else, including any input that cannot be read, blocks.
//!
//! Each branch emits one `tracing` event carrying a `reason` field so that
//! decisions can be audited; the log is never consulted by the decision.

use std::{fmt, sync::Arc};

use tracing::{debug, error, info, warn};

use crate::{
    digest::CertificateDigest,
    identity::TrustedIdentity,
    registry::{ActiveServiceRecord, CertificateStore, ServiceRegistry},
};

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Forward accessibility metadata and events unchanged.
    Allow,
    /// Suppress accessibility metadata and events.
    Block,
}

impl Decision {
    /// True for [`Decision::Block`].
    pub fn is_block(self) -> bool {
        matches!(self, Self::Block)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Block => "block",
        })
    }
}

/// The branch of the policy that produced a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// No assistive service is enabled.
    NoActiveService,
    /// The single enabled service is the trusted one and its certificate verified.
    Verified,
    /// The service list could not be obtained.
    RegistryUnavailable,
    /// More than one service is enabled.
    AmbiguousTrust {
        /// Number of enabled services.
        count: usize,
    },
    /// The single enabled service is not the trusted identifier.
    IdentityMismatch {
        /// Identifier that was found instead.
        found: String,
    },
    /// The signing certificate could not be retrieved.
    UnverifiableCertificate,
    /// The signing certificate does not hash to the expected digest.
    DigestMismatch,
}

impl Reason {
    /// The decision this branch resolves to.
    pub fn decision(&self) -> Decision {
        match self {
            Self::NoActiveService | Self::Verified => Decision::Allow,
            Self::RegistryUnavailable
            | Self::AmbiguousTrust { .. }
            | Self::IdentityMismatch { .. }
            | Self::UnverifiableCertificate
            | Self::DigestMismatch => Decision::Block,
        }
    }

    /// Stable snake_case key, used as the `reason` log field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::NoActiveService => "no_active_service",
            Self::Verified => "verified",
            Self::RegistryUnavailable => "registry_unavailable",
            Self::AmbiguousTrust { .. } => "ambiguous_trust",
            Self::IdentityMismatch { .. } => "identity_mismatch",
            Self::UnverifiableCertificate => "unverifiable_certificate",
            Self::DigestMismatch => "digest_mismatch",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveService => f.write_str("no assistive service is enabled"),
            Self::Verified => f.write_str("trusted service verified"),
            Self::RegistryUnavailable => f.write_str("service registry unavailable"),
            Self::AmbiguousTrust { count } => {
                write!(f, "{} assistive services are enabled", count)
            }
            Self::IdentityMismatch { found } => {
                write!(f, "enabled service {} is not the trusted service", found)
            }
            Self::UnverifiableCertificate => {
                f.write_str("signing certificate could not be retrieved")
            }
            Self::DigestMismatch => {
                f.write_str("signing certificate does not match the trusted digest")
            }
        }
    }
}

/// A decision together with the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Allow or block.
    pub decision: Decision,
    /// Why.
    pub reason: Reason,
}

impl From<Reason> for Verdict {
    fn from(reason: Reason) -> Self {
        Self {
            decision: reason.decision(),
            reason,
        }
    }
}

/// The trust policy for one [`TrustedIdentity`].
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    /// The only service that may observe accessibility traffic.
    identity: TrustedIdentity,
}

impl TrustPolicy {
    /// Policy trusting `identity`.
    pub fn new(identity: TrustedIdentity) -> Self {
        Self { identity }
    }

    /// The trusted identity.
    pub fn identity(&self) -> &TrustedIdentity {
        &self.identity
    }

    /// Decide from an already-enumerated service list.
    pub fn evaluate(
        &self,
        services: &[ActiveServiceRecord],
        certs: &dyn CertificateStore,
    ) -> Verdict {
        let svc = match services {
            [] => {
                debug!(reason = "no_active_service", "allowing accessibility events");
                return Reason::NoActiveService.into();
            }
            [svc] => svc,
            many => {
                warn!(
                    reason = "ambiguous_trust",
                    count = many.len(),
                    "blocking accessibility events: more than one service is enabled"
                );
                return Reason::AmbiguousTrust { count: many.len() }.into();
            }
        };

        if svc.service_identifier != self.identity.expected_identifier() {
            warn!(
                reason = "identity_mismatch",
                service = %svc.service_identifier,
                "blocking accessibility events: enabled service is not the trusted service"
            );
            return Reason::IdentityMismatch {
                found: svc.service_identifier.clone(),
            }
            .into();
        }

        let Some(cert) = certs.signing_certificate(&svc.certificate) else {
            error!(
                reason = "unverifiable_certificate",
                service = %svc.service_identifier,
                "blocking accessibility events: could not obtain signing certificate"
            );
            return Reason::UnverifiableCertificate.into();
        };

        let digest = CertificateDigest::of(&cert);
        if digest.matches_hex(self.identity.expected_digest_hex()) {
            info!(
                reason = "verified",
                service = %svc.service_identifier,
                "allowing accessibility events: verified trusted service is the only one enabled"
            );
            Reason::Verified.into()
        } else {
            warn!(
                reason = "digest_mismatch",
                service = %svc.service_identifier,
                digest = %digest,
                "blocking accessibility events: signing certificate digest does not match"
            );
            Reason::DigestMismatch.into()
        }
    }

    /// Decide from a live registry. An absent or failing registry blocks.
    pub fn evaluate_registry(
        &self,
        registry: Option<&dyn ServiceRegistry>,
        certs: &dyn CertificateStore,
    ) -> Verdict {
        let Some(registry) = registry else {
            warn!(
                reason = "registry_unavailable",
                "blocking accessibility events: no service registry"
            );
            return Reason::RegistryUnavailable.into();
        };
        match registry.active_services() {
            Ok(services) => self.evaluate(&services, certs),
            Err(e) => {
                warn!(
                    reason = "registry_unavailable",
                    error = %e,
                    "blocking accessibility events: service registry unreadable"
                );
                Reason::RegistryUnavailable.into()
            }
        }
    }
}

/// A policy bound to the platform lookups it reads on every call.
///
/// Holds no mutable state: each [`Evaluator::verdict`] re-reads the registry
/// and certificate store, so a service enabled between two calls is seen by
/// the second.
#[derive(Clone)]
pub struct Evaluator {
    /// Policy to apply.
    policy: TrustPolicy,
    /// Enabled-service lookup; `None` when the platform offers none.
    registry: Option<Arc<dyn ServiceRegistry>>,
    /// Signing-certificate lookup.
    certs: Arc<dyn CertificateStore>,
}

impl Evaluator {
    /// Bind `identity` to the platform lookups.
    pub fn new(
        identity: TrustedIdentity,
        registry: Option<Arc<dyn ServiceRegistry>>,
        certs: Arc<dyn CertificateStore>,
    ) -> Self {
        Self {
            policy: TrustPolicy::new(identity),
            registry,
            certs,
        }
    }

    /// The policy being applied.
    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Evaluate against the current platform state.
    pub fn verdict(&self) -> Verdict {
        self.policy
            .evaluate_registry(self.registry.as_deref(), self.certs.as_ref())
    }

    /// Evaluate against the current platform state, keeping only the decision.
    pub fn decide(&self) -> Decision {
        self.verdict().decision
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("policy", &self.policy)
            .field("registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}
