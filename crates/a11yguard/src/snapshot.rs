//! Device snapshots: a recorded registry state plus certificate files.
//!
//! ```ron
//! (
//!     services: Some([
//!         (identifier: "com.google.android.marvin.talkback", certificate: Some("talkback.der")),
//!     ]),
//! )
//! ```
//!
//! `services: None` records an unreadable registry. Certificate paths are
//! relative to the snapshot file.

use std::{
    fs,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use a11y_trust::{
    ActiveServiceRecord, CertificateRef, CertificateStore, RegistryError, ServiceRegistry,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// One enabled service as recorded.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    /// Service identifier.
    identifier: String,
    /// Certificate file, if the package resolved.
    #[serde(default)]
    certificate: Option<PathBuf>,
}

/// Snapshot file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSnapshot {
    /// Enabled services, or `None` when the registry could not be read.
    services: Option<Vec<RawService>>,
}

/// A recorded registry state, usable as a live [`ServiceRegistry`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Enabled services, or `None` when the registry could not be read.
    services: Option<Vec<ActiveServiceRecord>>,
}

impl Snapshot {
    /// Parse `text`, resolving certificate paths against `base`.
    pub fn from_ron(text: &str, base: &Path, origin: &Path) -> Result<Self> {
        let raw: RawSnapshot = ron::from_str(text).map_err(|e| Error::Snapshot {
            path: origin.to_path_buf(),
            line: e.span.start.line,
            col: e.span.start.col,
            message: e.code.to_string(),
        })?;
        let services = raw.services.map(|list| {
            list.into_iter()
                .map(|s| {
                    let handle = s
                        .certificate
                        .and_then(|p| certificate_handle(&base.join(p)))
                        .unwrap_or_default();
                    ActiveServiceRecord::with_certificate(s.identifier, CertificateRef::new(handle))
                })
                .collect()
        });
        Ok(Self { services })
    }

    /// Read and parse a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_ron(&text, base, path)
    }

    /// Recorded services, if the registry was readable.
    pub fn services(&self) -> Option<&[ActiveServiceRecord]> {
        self.services.as_deref()
    }
}

/// Handle naming the certificate file at `path`.
///
/// Handles are strings, so a path that is not valid UTF-8 has none. The empty
/// handle used instead never resolves, leaving the certificate unverifiable.
fn certificate_handle(path: &Path) -> Option<String> {
    let handle = path.to_str().map(str::to_string);
    if handle.is_none() {
        debug!(path = %path.display(), "certificate_path_not_utf8");
    }
    handle
}

impl ServiceRegistry for Snapshot {
    fn active_services(&self) -> StdResult<Vec<ActiveServiceRecord>, RegistryError> {
        self.services.clone().ok_or(RegistryError::Unavailable)
    }
}

/// Certificate store reading DER files named by the certificate handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCertificateStore;

impl CertificateStore for FileCertificateStore {
    fn signing_certificate(&self, cert: &CertificateRef) -> Option<Vec<u8>> {
        if cert.as_str().is_empty() {
            return None;
        }
        match fs::read(cert.as_str()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = cert.as_str(), error = %e, "certificate_unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn none_services_is_unavailable_registry() {
        let s = Snapshot::from_ron("(services: None)", Path::new("."), Path::new("s.ron")).unwrap();
        assert_eq!(s.active_services(), Err(RegistryError::Unavailable));
    }

    #[test]
    fn empty_services_is_empty_list() {
        let s =
            Snapshot::from_ron("(services: Some([]))", Path::new("."), Path::new("s.ron")).unwrap();
        assert_eq!(s.active_services(), Ok(vec![]));
    }

    #[test]
    fn certificate_paths_resolve_against_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.der"), b"cert-a").unwrap();
        let s = Snapshot::from_ron(
            "(services: Some([(identifier: \"x\", certificate: Some(\"a.der\")), (identifier: \"y\")]))",
            dir.path(),
            Path::new("s.ron"),
        )
        .unwrap();
        let svcs = s.services().unwrap();
        assert_eq!(svcs.len(), 2);
        let store = FileCertificateStore;
        assert_eq!(
            store.signing_certificate(&svcs[0].certificate),
            Some(b"cert-a".to_vec())
        );
        assert_eq!(store.signing_certificate(&svcs[1].certificate), None);
    }

    #[test]
    fn parse_error_reports_origin() {
        let err = Snapshot::from_ron("(services: ", Path::new("."), Path::new("bad.ron"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.ron"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_certificate_path_never_resolves() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        // A lossy rendering of the base would name this file.
        let lossy = dir.path().join("snap\u{FFFD}");
        fs::create_dir(&lossy).unwrap();
        fs::write(lossy.join("a.der"), b"cert").unwrap();

        let base = dir.path().join(OsStr::from_bytes(b"snap\xff"));
        assert_eq!(certificate_handle(&base.join("a.der")), None);
        let s = Snapshot::from_ron(
            "(services: Some([(identifier: \"x\", certificate: Some(\"a.der\"))]))",
            &base,
            Path::new("s.ron"),
        )
        .unwrap();
        let svc = &s.services().unwrap()[0];
        assert_eq!(svc.certificate.as_str(), "");
        assert_eq!(FileCertificateStore.signing_certificate(&svc.certificate), None);
    }

    #[test]
    fn utf8_certificate_path_is_kept_verbatim() {
        let p = Path::new("/data/certs/talkback.der");
        assert_eq!(
            certificate_handle(p).as_deref(),
            Some("/data/certs/talkback.der")
        );
    }

    #[test]
    fn missing_certificate_file_is_none() {
        let store = FileCertificateStore;
        assert_eq!(
            store.signing_certificate(&CertificateRef::new("/nonexistent/cert.der")),
            None
        );
    }
}
