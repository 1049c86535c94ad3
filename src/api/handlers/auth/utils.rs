//! Small helpers for credential checks and session tokens.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};

/// Normalize an email for comparisons.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a new session token for the auth cookie.
pub(super) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Compare secrets without short-circuiting on the first differing byte.
pub(super) fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Admin@Example.SE "), "admin@example.se");
    }

    #[test]
    fn session_tokens_are_url_safe_and_unique() -> Result<()> {
        let first = generate_session_token()?;
        let second = generate_session_token()?;
        assert_ne!(first, second);
        // 32 bytes, base64url without padding
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        Ok(())
    }

    #[test]
    fn constant_time_eq_matches_plain_eq() {
        assert!(constant_time_eq(b"hemligt", b"hemligt"));
        assert!(!constant_time_eq(b"hemligt", b"hemligT"));
        assert!(!constant_time_eq(b"kort", b"langre"));
        assert!(constant_time_eq(b"", b""));
    }
}
