use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Generate an opaque kiosk entry token for a location.
///
/// 24 random bytes, URL-safe base64 so the token can sit in a path
/// segment. Uniqueness is backed by the column's UNIQUE constraint.
pub fn generate_clock_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_url_safe_and_distinct() {
        let a = generate_clock_token();
        let b = generate_clock_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
