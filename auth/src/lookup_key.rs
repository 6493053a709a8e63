use std::fmt::{Display, Formatter, Write};

use sha2::{Digest, Sha256};

use crate::credentials::Credentials;

/// Opaque store key derived from a credential pair.
///
/// Lowercase hex SHA-256 of `username ":" password`. The layout matches keys
/// already provisioned into the store, so it must not change without a
/// migration of every stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub const HEX_LEN: usize = 64;

    /// Hash the pair exactly as received; no text decoding is applied.
    pub fn derive(username: impl AsRef<[u8]>, password: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(username.as_ref());
        hasher.update(b":");
        hasher.update(password.as_ref());
        let digest = hasher.finalize();

        let mut hex_string = String::with_capacity(Self::HEX_LEN);
        for b in digest.iter() {
            // Writing to a String is infallible; discard the always-Ok result.
            let _ = write!(hex_string, "{b:02x}");
        }
        Self(hex_string)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix that is safe to put in debug logs.
    pub fn fingerprint(&self) -> &str {
        &self.0[..12]
    }
}

impl From<&Credentials> for LookupKey {
    fn from(credentials: &Credentials) -> Self {
        Self::derive(credentials.username(), credentials.password())
    }
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn matches_known_digest() {
        let key = LookupKey::derive("alice", "secret");
        assert_eq!(
            key.as_str(),
            "3d11dc479c08e3b368773103d64766c2e420ce39727932fcf2d8f4d9d599be59"
        );
        assert_eq!(key.as_str().len(), LookupKey::HEX_LEN);
        assert_eq!(key.fingerprint(), "3d11dc479c08");
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(
            LookupKey::derive("alice", "secret"),
            LookupKey::derive("alice", "secret")
        );
        let creds = Credentials::new("alice", "secret");
        assert_eq!(LookupKey::from(&creds), LookupKey::derive("alice", "secret"));
    }

    #[test]
    fn hashes_non_utf8_bytes_verbatim() {
        let key = LookupKey::derive(b"jos\xe9", b"p\xe4ss");
        assert_eq!(
            key.as_str(),
            "63c4a5b891ab9393b12b6af2b35b659b516d756f282c680b3164108080499a30"
        );
        let creds = Credentials::new(&b"jos\xe9"[..], &b"p\xe4ss"[..]);
        assert_eq!(LookupKey::from(&creds), key);
    }

    #[test]
    fn separator_distinguishes_splits() {
        assert_ne!(LookupKey::derive("ab", "c"), LookupKey::derive("a", "bc"));
        assert_ne!(LookupKey::derive("", "abc"), LookupKey::derive("abc", ""));
    }

    #[test]
    fn no_collisions_across_generated_corpus() {
        let mut seen = HashSet::new();
        for user in 0..200 {
            for pass in 0..50 {
                let key = LookupKey::derive(&format!("user{user}"), &format!("pw{pass}"));
                assert!(
                    key.as_str()
                        .chars()
                        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
                    "key must be lowercase hex"
                );
                assert!(seen.insert(key), "collision for user{user}/pw{pass}");
            }
        }
        assert_eq!(seen.len(), 200 * 50);
    }
}
