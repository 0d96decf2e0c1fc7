//! SHA-256 digests of signing certificates.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length in hex digits of a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 digest of a signing certificate's raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateDigest([u8; 32]);

impl CertificateDigest {
    /// Digest the raw certificate bytes.
    pub fn of(cert: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(cert);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compare against a hex string, ignoring case.
    ///
    /// The whole string must match: a prefix, suffix, or a digest with extra
    /// characters never compares equal.
    pub fn matches_hex(&self, expected: &str) -> bool {
        expected.len() == DIGEST_HEX_LEN && self.to_hex().eq_ignore_ascii_case(expected)
    }
}

impl fmt::Debug for CertificateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateDigest({})", self.to_hex())
    }
}

impl fmt::Display for CertificateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// True when `s` is a well-formed SHA-256 hex digest in either case.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the ASCII string "abc".
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn known_vector() {
        assert_eq!(CertificateDigest::of(b"abc").to_hex(), ABC);
    }

    #[test]
    fn empty_input_digests() {
        assert_eq!(
            CertificateDigest::of(&[]).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn match_ignores_case() {
        let d = CertificateDigest::of(b"abc");
        assert!(d.matches_hex(ABC));
        assert!(d.matches_hex(&ABC.to_ascii_uppercase()));
    }

    #[test]
    fn match_rejects_truncated_and_extended() {
        let d = CertificateDigest::of(b"abc");
        assert!(!d.matches_hex(&ABC[..63]));
        assert!(!d.matches_hex(&ABC[..8]));
        assert!(!d.matches_hex(&format!("{ABC}0")));
        assert!(!d.matches_hex(&format!("0{ABC}")));
        assert!(!d.matches_hex(""));
    }

    #[test]
    fn match_rejects_single_char_difference() {
        let d = CertificateDigest::of(b"abc");
        let mut off = ABC.to_string();
        off.replace_range(63..64, "e");
        assert!(!d.matches_hex(&off));
    }

    #[test]
    fn digest_hex_shape() {
        assert!(is_digest_hex(ABC));
        assert!(is_digest_hex(&ABC.to_ascii_uppercase()));
        assert!(!is_digest_hex(&ABC[1..]));
        assert!(!is_digest_hex(&ABC.replace('b', "g")));
    }
}
