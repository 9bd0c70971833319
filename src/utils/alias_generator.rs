//! Short alias generation.
//!
//! Aliases are drawn uniformly from a 64-symbol URL-safe alphabet using the
//! operating system's random source. Collisions are not checked here; the
//! storage backend's uniqueness constraint catches them.

use crate::error::ShortenerError;

/// URL-safe alphabet; its length divides 256, so `byte % 64` is unbiased.
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Default alias length.
pub const DEFAULT_ALIAS_LENGTH: usize = 9;

/// Source of short aliases for stored URLs.
#[cfg_attr(test, mockall::automock)]
pub trait AliasGenerator: Send + Sync {
    /// Produces a fresh alias.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Entropy`] if the random source fails.
    fn generate(&self) -> Result<String, ShortenerError>;
}

/// Generates random fixed-length aliases.
#[derive(Debug, Clone)]
pub struct RandomAliasGenerator {
    length: usize,
}

impl RandomAliasGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomAliasGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_LENGTH)
    }
}

impl AliasGenerator for RandomAliasGenerator {
    fn generate(&self) -> Result<String, ShortenerError> {
        let mut buffer = vec![0u8; self.length];

        getrandom::fill(&mut buffer).map_err(|e| ShortenerError::Entropy(e.to_string()))?;

        Ok(buffer
            .into_iter()
            .map(|b| ALPHABET[(b % 64) as usize] as char)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_default_length() {
        let alias = RandomAliasGenerator::default().generate().unwrap();
        assert_eq!(alias.len(), DEFAULT_ALIAS_LENGTH);
    }

    #[test]
    fn test_generate_custom_length() {
        let alias = RandomAliasGenerator::new(12).generate().unwrap();
        assert_eq!(alias.len(), 12);
    }

    #[test]
    fn test_generate_url_safe_characters() {
        let generator = RandomAliasGenerator::default();
        for _ in 0..100 {
            let alias = generator.generate().unwrap();
            assert!(
                alias
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            );
        }
    }

    #[test]
    fn test_generate_produces_unique_aliases() {
        let generator = RandomAliasGenerator::default();
        let aliases: HashSet<String> = (0..1000).map(|_| generator.generate().unwrap()).collect();

        assert_eq!(aliases.len(), 1000);
    }
}
