//! Share token generation.
//!
//! A share token is the public, unauthenticated address of a moodboard:
//! 22 symbols drawn uniformly from a 64-symbol URL-safe alphabet, giving
//! 132 bits of randomness.
//!
//! The generator knows nothing about tokens already in use. Uniqueness is
//! enforced where records are persisted: see
//! [`insert_with_fresh_token`](crate::store::insert_with_fresh_token), which
//! regenerates on conflict with a bounded number of attempts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of symbols in every share token.
pub const TOKEN_LENGTH: usize = 22;

/// The token alphabet, in index order.
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("share token must be {TOKEN_LENGTH} characters, got {0}")]
    Length(usize),
    #[error("share token contains invalid character {0:?}")]
    Symbol(char),
}

/// A well-formed share token. Immutable once assigned to a moodboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
    /// Generate a token from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Generate a token from an explicit RNG (seedable in tests).
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let token = (0..TOKEN_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShareToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != TOKEN_LENGTH {
            return Err(TokenError::Length(count));
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8))) {
            return Err(TokenError::Symbol(bad));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ShareToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShareToken> for String {
    fn from(token: ShareToken) -> Self {
        token.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can hand out candidate tokens.
///
/// Production code uses [`RandomTokens`]; tests script collisions.
pub trait TokenSource {
    fn next_token(&self) -> ShareToken;
}

/// Candidate tokens from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&self) -> ShareToken {
        ShareToken::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn alphabet_has_64_distinct_symbols() {
        let distinct: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(distinct.len(), 64);
    }

    #[test]
    fn generated_token_has_fixed_length() {
        for _ in 0..100 {
            assert_eq!(ShareToken::generate().as_str().len(), TOKEN_LENGTH);
        }
    }

    #[test]
    fn generated_token_uses_only_alphabet() {
        for _ in 0..100 {
            let token = ShareToken::generate();
            assert!(token.as_str().bytes().all(|b| ALPHABET.contains(&b)), "{token}");
        }
    }

    #[test]
    fn ten_thousand_tokens_are_distinct() {
        let tokens: HashSet<ShareToken> = (0..10_000).map(|_| ShareToken::generate()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = ShareToken::generate_with(&mut StdRng::seed_from_u64(7));
        let b = ShareToken::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn symbols_cover_alphabet_over_many_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<char> = (0..2_000)
            .flat_map(|_| ShareToken::generate_with(&mut rng).0.chars().collect::<Vec<_>>())
            .collect();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn parse_accepts_generated_token() {
        let token = ShareToken::generate();
        assert_eq!(token.as_str().parse::<ShareToken>().unwrap(), token);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!("abc".parse::<ShareToken>(), Err(TokenError::Length(3)));
    }

    #[test]
    fn parse_rejects_foreign_symbol() {
        let err = "abcdefghijklmnopqrstu+".parse::<ShareToken>().unwrap_err();
        assert_eq!(err, TokenError::Symbol('+'));
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: Result<ShareToken, _> = serde_json::from_str(r#""AAAAAAAAAAAAAAAAAAAAAA""#);
        assert!(ok.is_ok());
        let bad: Result<ShareToken, _> = serde_json::from_str(r#""short""#);
        assert!(bad.is_err());
    }
}
