//! Authentication utilities library
//!
//! Provides the stateless building blocks of the token lifecycle:
//! - Password hashing (Argon2id)
//! - Typed JWT signing and verification (access, refresh and purpose tokens)
//! - An injectable clock so that expiry checks are deterministic
//!
//! Nothing in this crate performs I/O. Persisting refresh and purpose tokens is
//! the job of the service that uses it.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password1").unwrap();
//! assert!(hasher.verify("my_password1", &hash).unwrap());
//! assert!(!hasher.verify("other_password1", &hash).unwrap());
//! ```
//!
//! ## Signing and verifying tokens
//! ```
//! use auth::{JwtError, TokenCodec, TokenType};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let signed = codec
//!     .sign("user123", TokenType::Refresh, Duration::days(30))
//!     .unwrap();
//!
//! let claims = codec.verify(&signed.token, TokenType::Refresh).unwrap();
//! assert_eq!(claims.sub, "user123");
//!
//! // A refresh token cannot be used where a verify-email token is expected
//! let err = codec.verify(&signed.token, TokenType::VerifyEmail).unwrap_err();
//! assert!(matches!(err, JwtError::TypeMismatch { .. }));
//! ```

pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SignedToken;
pub use jwt::TokenCodec;
pub use jwt::TokenType;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
