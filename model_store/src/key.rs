use std::{fmt, str::FromStr};

use crate::error::{Result, StoreErr};

/// The longest key accepted, in bytes.
pub const MAX_KEY_LEN: usize = 128;

/// A validated store key.
///
/// Keys are made of ASCII letters, digits, `_`, `-` and `.`, and never contain `..`,
/// so they can't escape the directory they're placed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Validates a raw key.
    ///
    /// # Errors
    /// Returns `StoreErr::InvalidKey` describing the first rule the key breaks.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason| {
            Err(StoreErr::InvalidKey {
                key: raw.to_string(),
                reason,
            })
        };

        if raw.is_empty() {
            return invalid("must not be empty");
        }

        if raw.len() > MAX_KEY_LEN {
            return invalid("must be at most 128 characters long");
        }

        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            return invalid("may only contain ASCII letters, digits, '_', '-' and '.'");
        }

        if raw == "." || raw.contains("..") {
            return invalid("must not be a relative path segment");
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = StoreErr;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_ids() {
        for raw in ["42", "alice", "user_1", "a-b.c", "X"] {
            assert_eq!(Key::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_path_traversal() {
        for raw in ["", ".", "..", "../etc", "a/b", "a\\b", "/abs", "a..b", "nul\0"] {
            assert!(
                matches!(Key::parse(raw), Err(StoreErr::InvalidKey { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_long_and_non_ascii_keys() {
        assert!(Key::parse(&"a".repeat(MAX_KEY_LEN)).is_ok());
        assert!(Key::parse(&"a".repeat(MAX_KEY_LEN + 1)).is_err());
        assert!(Key::parse("usér").is_err());
        assert!(Key::parse("two words").is_err());
    }
}
