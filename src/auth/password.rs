use crate::AppError;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        // Low cost keeps the test fast
        let hash = bcrypt::hash("hunter2", 4).unwrap();

        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
