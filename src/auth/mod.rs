pub mod clock_token;
pub mod jwt;
pub mod password;
pub mod pin;

pub use clock_token::generate_clock_token;
pub use jwt::{sign_token, verify_token, Claims};
pub use password::{hash_password, verify_password};
pub use pin::pin_matches;
