use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppError;

/// Access tokens live for one working day.
const TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issue an HS256 access token for a user.
pub fn sign_token(user_id: Uuid, company_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        company_id,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Validate a token and return its claims. Expiry is checked by the library.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    #[test]
    fn test_sign_and_verify_token() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();

        let token = sign_token(user_id, company_id, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.company_id, company_id);
    }

    #[test]
    fn test_token_with_wrong_secret() {
        let token = sign_token(Uuid::new_v4(), Uuid::new_v4(), SECRET).unwrap();
        let result = verify_token(&token, "a_completely_different_secret_key");

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            iat: now - 7200,
            // Past the default 60s validation leeway
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token() {
        assert!(verify_token("not_a_token", SECRET).is_err());
    }
}
