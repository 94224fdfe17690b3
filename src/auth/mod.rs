//! Authentication for login-gated frames.
//!
//! This module provides:
//! - `Authenticator` trait consulted by the login state machine (always available)
//! - Password hashing and a credential-table authenticator (feature-gated: `authentication`)

use crate::error::EvalError;

#[cfg(feature = "authentication")]
pub mod credentials;

#[cfg(feature = "authentication")]
pub mod password;

#[cfg(feature = "authentication")]
pub use credentials::{CredentialAuthenticator, User};

#[cfg(feature = "authentication")]
pub use password::Sha256Hasher;

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPoll {
    /// Answer is known: a token on success, `None` on rejection.
    Ready(Option<String>),

    /// Answer will arrive later through `Terminal::complete_login`.
    ///
    /// The terminal stays paused until then.
    Pending,
}

/// Credential check behind a login-gated frame.
///
/// Implemented for any `Fn(&str, &str) -> Result<AuthPoll, EvalError>`.
///
/// # Example
///
/// ```rust,ignore
/// let frame = Frame::new(shell).with_login(|user: &str, password: &str| {
///     Ok(AuthPoll::Ready(
///         (user == "demo" && password == "demo").then(|| String::from("demo-token")),
///     ))
/// });
/// ```
pub trait Authenticator {
    /// Check `user`/`password`.
    ///
    /// An empty token counts as a rejection. An `Err` is reported with the
    /// `LOGIN` label and the terminal returns to the username prompt.
    fn authenticate(&self, user: &str, password: &str) -> Result<AuthPoll, EvalError>;
}

impl<F> Authenticator for F
where
    F: Fn(&str, &str) -> Result<AuthPoll, EvalError>,
{
    fn authenticate(&self, user: &str, password: &str) -> Result<AuthPoll, EvalError> {
        self(user, password)
    }
}

/// Password hasher trait (requires authentication feature).
///
/// Provides password hashing and verification with salt.
#[cfg(feature = "authentication")]
pub trait PasswordHasher {
    /// Hash password with salt.
    fn hash(&self, password: &str, salt: &[u8]) -> [u8; 32];

    /// Verify password against hash.
    ///
    /// MUST use constant-time comparison to prevent timing attacks.
    fn verify(&self, password: &str, salt: &[u8], hash: &[u8; 32]) -> bool;
}
