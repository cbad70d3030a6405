//! Cache key fingerprinting.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Fixed-length, filesystem-safe digest of a cache key.
///
/// Used both as the memory cache key and as the disk cache filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of the hex representation.
    pub const LEN: usize = FINGERPRINT_BYTES * 2;

    /// Wraps an already computed fingerprint string.
    ///
    /// Returns `None` unless the value is exactly [`Self::LEN`] lowercase hex characters.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == Self::LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(value.to_string()))
    }

    /// Returns the hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the fingerprint of a cache key (usually an image URL).
#[must_use]
pub fn fingerprint(key: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    Fingerprint(hex::encode(&digest[..FINGERPRINT_BYTES]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_fixed_length_hex() {
        let fp = fingerprint("https://api.example.com/get_product_photo/64f1a2b3");
        assert_eq!(fp.as_str().len(), Fingerprint::LEN);
        assert!(
            fp.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let url = "https://api.example.com/get_product_photo/abc";
        assert_eq!(fingerprint(url), fingerprint(url));
    }

    #[test]
    fn test_distinct_keys_differ() {
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_empty_key_is_valid() {
        let fp = fingerprint("");
        assert_eq!(fp.as_str().len(), Fingerprint::LEN);
    }

    #[test]
    fn test_fingerprint_has_no_path_separators() {
        let fp = fingerprint("../../etc/passwd");
        assert!(!fp.as_str().contains('/'));
        assert!(!fp.as_str().contains('\\'));
        assert!(!fp.as_str().contains('.'));
    }

    #[test]
    fn test_parse_roundtrips_derived_value() {
        let fp = fingerprint("key");
        assert_eq!(Fingerprint::parse(fp.as_str()), Some(fp));
        assert_eq!(Fingerprint::parse("not-a-fingerprint"), None);
        assert_eq!(Fingerprint::parse(&"A".repeat(Fingerprint::LEN)), None);
    }
}
