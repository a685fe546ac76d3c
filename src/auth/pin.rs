use subtle::ConstantTimeEq;

/// Compare a submitted kiosk PIN against the configured one.
///
/// A user with no PIN configured passes regardless of what was submitted.
/// When a PIN is configured the submission must be present and match;
/// comparison is constant-time.
pub fn pin_matches(configured: Option<&str>, provided: Option<&str>) -> bool {
    match configured {
        None => true,
        Some(expected) => match provided {
            Some(given) => expected.as_bytes().ct_eq(given.as_bytes()).into(),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pin_configured_always_passes() {
        assert!(pin_matches(None, None));
        assert!(pin_matches(None, Some("1234")));
    }

    #[test]
    fn test_configured_pin_requires_match() {
        assert!(pin_matches(Some("4821"), Some("4821")));
        assert!(!pin_matches(Some("4821"), Some("4822")));
        assert!(!pin_matches(Some("4821"), None));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(!pin_matches(Some("4821"), Some("482")));
        assert!(!pin_matches(Some("4821"), Some("48210")));
    }
}
