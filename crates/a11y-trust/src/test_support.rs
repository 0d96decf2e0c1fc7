//! In-memory platform lookups for tests.
//! These helpers are public so downstream crates can drive the policy without
//! a real accessibility manager or package store.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::registry::{
    ActiveServiceRecord, CertificateRef, CertificateStore, RegistryError, ServiceRegistry,
};

/// Registry returning a settable service list, or failing on demand.
#[derive(Debug, Default)]
pub struct MockServiceRegistry {
    /// Services returned by the next read.
    services: Mutex<Vec<ActiveServiceRecord>>,
    /// When set, reads fail with this error.
    failure: Mutex<Option<RegistryError>>,
    /// Number of reads so far.
    reads: AtomicUsize,
}

impl MockServiceRegistry {
    /// Registry with no enabled services.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `services`.
    pub fn with_services(services: Vec<ActiveServiceRecord>) -> Self {
        let r = Self::new();
        r.set_services(services);
        r
    }

    /// Replace the enabled services.
    pub fn set_services(&self, services: Vec<ActiveServiceRecord>) {
        *self.services.lock() = services;
    }

    /// Enable one more service.
    pub fn push_service(&self, service: ActiveServiceRecord) {
        self.services.lock().push(service);
    }

    /// Make subsequent reads fail with [`RegistryError::Unavailable`], or succeed again.
    pub fn set_fail(&self, v: bool) {
        *self.failure.lock() = v.then_some(RegistryError::Unavailable);
    }

    /// Make subsequent reads fail with `err`.
    pub fn set_failure(&self, err: RegistryError) {
        *self.failure.lock() = Some(err);
    }

    /// Number of reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ServiceRegistry for MockServiceRegistry {
    fn active_services(&self) -> Result<Vec<ActiveServiceRecord>, RegistryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        Ok(self.services.lock().clone())
    }
}

/// Certificate store backed by a map from handle to certificate bytes.
#[derive(Debug, Default, Clone)]
pub struct MockCertificateStore {
    /// Certificates by handle.
    certs: Arc<Mutex<HashMap<CertificateRef, Vec<u8>>>>,
    /// Number of lookups so far.
    lookups: Arc<AtomicUsize>,
}

impl MockCertificateStore {
    /// Empty store: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `cert` under the handle `handle`.
    pub fn insert(&self, handle: &str, cert: &[u8]) {
        self.certs
            .lock()
            .insert(CertificateRef::new(handle), cert.to_vec());
    }

    /// Forget the certificate under `handle`.
    pub fn remove(&self, handle: &str) {
        self.certs.lock().remove(&CertificateRef::new(handle));
    }

    /// Number of lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CertificateStore for MockCertificateStore {
    fn signing_certificate(&self, cert: &CertificateRef) -> Option<Vec<u8>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.certs.lock().get(cert).cloned()
    }
}
