//! The single trusted assistive service, as static configuration.
//!
//! A [`TrustedIdentity`] is built once, before the first evaluation, either
//! from the compiled-in defaults ([`TrustedIdentity::talkback`]) or from a RON
//! document:
//!
//! ```ron
//! (
//!     expected_identifier: "com.google.android.marvin.talkback",
//!     expected_digest_hex: "3d6c1b35787b415286595a847250b2990494541517451296a202a6b251a37c44",
//! )
//! ```
//!
//! Construction validates both fields, so a held `TrustedIdentity` is always
//! usable by the policy.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    digest::{DIGEST_HEX_LEN, is_digest_hex},
};

/// Package identifier of the Android TalkBack screen reader.
pub const TALKBACK_IDENTIFIER: &str = "com.google.android.marvin.talkback";

/// SHA-256 of the TalkBack release signing certificate.
pub const TALKBACK_DIGEST_HEX: &str =
    "3d6c1b35787b415286595a847250b2990494541517451296a202a6b251a37c44";

/// Serialized form, validated into a [`TrustedIdentity`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIdentity {
    /// Identifier of the trusted service's providing package.
    expected_identifier: String,
    /// Hex SHA-256 of its signing certificate.
    expected_digest_hex: String,
}

/// Identifier plus expected signing-certificate digest of the one trusted service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedIdentity {
    /// Identifier of the trusted service's providing package.
    expected_identifier: String,
    /// Lowercase hex SHA-256 of its signing certificate.
    expected_digest_hex: String,
}

impl TrustedIdentity {
    /// Build a validated identity. The digest is normalized to lowercase.
    pub fn new(
        expected_identifier: impl Into<String>,
        expected_digest_hex: impl AsRef<str>,
    ) -> Result<Self, Error> {
        let expected_identifier = expected_identifier.into();
        if expected_identifier.is_empty() {
            return Err(Error::Validation {
                path: None,
                field: "expected_identifier",
                message: "must not be empty".into(),
            });
        }
        if expected_identifier.trim() != expected_identifier {
            return Err(Error::Validation {
                path: None,
                field: "expected_identifier",
                message: format!(
                    "must not carry surrounding whitespace: {:?}",
                    expected_identifier
                ),
            });
        }
        let digest = expected_digest_hex.as_ref();
        if !is_digest_hex(digest) {
            return Err(Error::Validation {
                path: None,
                field: "expected_digest_hex",
                message: format!(
                    "must be {} hex digits (got {} characters)",
                    DIGEST_HEX_LEN,
                    digest.len()
                ),
            });
        }
        Ok(Self {
            expected_identifier,
            expected_digest_hex: digest.to_ascii_lowercase(),
        })
    }

    /// The compiled-in identity: Google TalkBack.
    pub fn talkback() -> Self {
        Self {
            expected_identifier: TALKBACK_IDENTIFIER.to_string(),
            expected_digest_hex: TALKBACK_DIGEST_HEX.to_string(),
        }
    }

    /// Parse and validate an identity from RON text.
    pub fn from_ron(text: &str) -> Result<Self, Error> {
        let raw: RawIdentity = ron::from_str(text).map_err(|e| Error::Parse {
            path: None,
            line: e.span.start.line,
            col: e.span.start.col,
            message: e.code.to_string(),
        })?;
        Self::new(raw.expected_identifier, raw.expected_digest_hex)
    }

    /// Read, parse and validate an identity file.
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|e| Error::Read {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        let identity = Self::from_ron(&text).map_err(|e| e.with_path(path.to_path_buf()))?;
        tracing::debug!(
            path = %path.display(),
            identifier = %identity.expected_identifier,
            "trusted_identity_loaded"
        );
        Ok(identity)
    }

    /// Render as pretty RON, in the same shape [`Self::from_ron`] accepts.
    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Identifier the single active service must carry.
    pub fn expected_identifier(&self) -> &str {
        &self.expected_identifier
    }

    /// Lowercase hex digest the service's signing certificate must hash to.
    pub fn expected_digest_hex(&self) -> &str {
        &self.expected_digest_hex
    }
}

impl Default for TrustedIdentity {
    fn default() -> Self {
        Self::talkback()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    /// A valid digest distinct from TalkBack's.
    const OTHER: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn talkback_defaults_validate() {
        let built = TrustedIdentity::new(TALKBACK_IDENTIFIER, TALKBACK_DIGEST_HEX).unwrap();
        assert_eq!(built, TrustedIdentity::talkback());
        assert_eq!(TrustedIdentity::default(), TrustedIdentity::talkback());
    }

    #[test]
    fn digest_is_lowercased() {
        let id = TrustedIdentity::new("com.trusted.assist", OTHER.to_ascii_uppercase()).unwrap();
        assert_eq!(id.expected_digest_hex(), OTHER);
    }

    #[test]
    fn rejects_bad_digest() {
        let short = TrustedIdentity::new("com.trusted.assist", &OTHER[..40]).unwrap_err();
        assert!(matches!(
            short,
            Error::Validation {
                field: "expected_digest_hex",
                ..
            }
        ));
        let nonhex = OTHER.replace('a', "z");
        assert!(TrustedIdentity::new("com.trusted.assist", nonhex).is_err());
    }

    #[test]
    fn rejects_bad_identifier() {
        assert!(TrustedIdentity::new("", OTHER).is_err());
        assert!(TrustedIdentity::new(" com.trusted.assist", OTHER).is_err());
    }

    #[test]
    fn parses_ron() {
        let id = TrustedIdentity::from_ron(&format!(
            "(expected_identifier: \"com.trusted.assist\", expected_digest_hex: \"{OTHER}\")"
        ))
        .unwrap();
        assert_eq!(id.expected_identifier(), "com.trusted.assist");
        assert_eq!(id.expected_digest_hex(), OTHER);
    }

    #[test]
    fn ron_round_trips_through_to_ron() {
        let id = TrustedIdentity::talkback();
        assert_eq!(TrustedIdentity::from_ron(&id.to_ron()).unwrap(), id);
    }

    #[test]
    fn ron_parse_error_has_location() {
        let err = TrustedIdentity::from_ron("(expected_identifier: )").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn ron_unknown_field_rejected() {
        let text = format!(
            "(expected_identifier: \"a\", expected_digest_hex: \"{OTHER}\", extra: 1)"
        );
        assert!(matches!(
            TrustedIdentity::from_ron(&text),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn load_from_path_reports_path() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "(expected_identifier: \"com.trusted.assist\", expected_digest_hex: \"abc\")"
        )
        .unwrap();
        let err = TrustedIdentity::load_from_path(f.path()).unwrap_err();
        assert!(err.pretty().contains(&f.path().display().to_string()));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrustedIdentity::load_from_path(&dir.path().join("missing.ron")).unwrap_err();
        assert!(matches!(err, Error::Read { path: Some(_), .. }));
    }
}
