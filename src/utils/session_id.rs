//! Editor session identifiers.

use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

/// Random bytes per identifier; encodes to 22 URL-safe characters.
const SESSION_ID_BYTES: usize = 16;

static SESSION_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{22}$").expect("valid session id regex"));

/// Generates a random session identifier.
///
/// # Panics
///
/// Panics if the system random number generator fails.
pub fn generate_session_id() -> String {
    let mut buffer = [0u8; SESSION_ID_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Checks that a path segment looks like a generated session id.
pub fn is_valid_session_id(id: &str) -> bool {
    SESSION_ID_REGEX.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_valid() {
        for _ in 0..100 {
            let id = generate_session_id();
            assert_eq!(id.len(), 22);
            assert!(is_valid_session_id(&id), "{id}");
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_session_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("short"));
        assert!(!is_valid_session_id("../../etc/passwd-xxxxxx"));
        assert!(!is_valid_session_id("AAAAAAAAAAAAAAAAAAAAAAA"));
    }
}
