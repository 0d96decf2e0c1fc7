//! Platform collaborators consumed by the policy.
//!
//! The host platform supplies two read-only lookups: the list of currently
//! enabled assistive services, and the signing certificates of installed
//! packages. Both are queried on every evaluation; nothing here is cached.

use std::fmt;

use thiserror::Error;

/// Opaque handle a [`CertificateStore`] resolves to signing certificates.
///
/// On most platforms this is the package name of the application that provides
/// the service, but callers should not rely on that.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CertificateRef(String);

impl CertificateRef {
    /// Wrap a platform-specific handle.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The underlying handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateRef({})", self.0)
    }
}

/// One currently enabled assistive service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveServiceRecord {
    /// Stable identifier of the providing package.
    pub service_identifier: String,
    /// Handle for retrieving the provider's signing certificate.
    pub certificate: CertificateRef,
}

impl ActiveServiceRecord {
    /// Record whose certificate handle is the service identifier itself.
    pub fn new(service_identifier: impl Into<String>) -> Self {
        let service_identifier = service_identifier.into();
        Self {
            certificate: CertificateRef::new(service_identifier.clone()),
            service_identifier,
        }
    }

    /// Record with an explicit certificate handle.
    pub fn with_certificate(
        service_identifier: impl Into<String>,
        certificate: CertificateRef,
    ) -> Self {
        Self {
            service_identifier: service_identifier.into(),
            certificate,
        }
    }
}

/// The service list could not be read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The platform accessibility manager is not reachable.
    #[error("accessibility service registry unavailable")]
    Unavailable,
    /// The registry answered, but the answer could not be interpreted.
    #[error("accessibility service registry failed: {0}")]
    Failed(String),
}

/// Enumerates the currently enabled assistive services.
///
/// `Ok(vec![])` means no service is enabled. Any failure to read the list must
/// be reported as `Err`, never as an empty list.
pub trait ServiceRegistry: Send + Sync {
    /// Currently enabled services, across all feedback types.
    fn active_services(&self) -> Result<Vec<ActiveServiceRecord>, RegistryError>;
}

/// Resolves installed packages to their signing certificates.
pub trait CertificateStore: Send + Sync {
    /// Raw bytes of the first signing certificate, or `None` when the package
    /// cannot be resolved or carries no signatures.
    fn signing_certificate(&self, cert: &CertificateRef) -> Option<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_certificate_to_identifier() {
        let r = ActiveServiceRecord::new("com.trusted.assist");
        assert_eq!(r.certificate.as_str(), "com.trusted.assist");
    }

    #[test]
    fn registry_errors_describe_the_failure() {
        assert_eq!(
            RegistryError::Failed("bad list".into()).to_string(),
            "accessibility service registry failed: bad list"
        );
        assert_eq!(
            RegistryError::Unavailable.to_string(),
            "accessibility service registry unavailable"
        );
    }

    #[test]
    fn record_with_explicit_certificate() {
        let r = ActiveServiceRecord::with_certificate("svc", CertificateRef::new("pkg"));
        assert_eq!(r.service_identifier, "svc");
        assert_eq!(r.certificate, CertificateRef::new("pkg"));
    }
}
