//! Authenticator backed by a table of salted password hashes.
//!
//! Successful logins are issued a fresh random token. Users can be built in
//! code or loaded from TOML:
//!
//! ```toml
//! [[users]]
//! username = "alice"
//! salt = "0101...01"   # 16 bytes, hex
//! hash = "9f86...08"   # 32 bytes, hex
//! ```

use crate::auth::{AuthPoll, Authenticator, PasswordHasher, Sha256Hasher};
use crate::error::{EvalError, TerminalError};
use serde::Deserialize;
use tracing::debug;

/// Random bytes per issued token.
const TOKEN_BYTES: usize = 16;

/// Stored credentials of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name (case sensitive)
    pub username: String,

    /// Hash of salt + password
    pub password_hash: [u8; 32],

    /// Per-user salt
    pub salt: [u8; 16],
}

impl User {
    /// Create a user from a pre-computed hash.
    pub fn new(username: &str, password_hash: [u8; 32], salt: [u8; 16]) -> Self {
        Self {
            username: username.to_owned(),
            password_hash,
            salt,
        }
    }

    /// Create a user by hashing `password` with `salt`.
    pub fn with_password<H: PasswordHasher>(
        username: &str,
        password: &str,
        salt: [u8; 16],
        hasher: &H,
    ) -> Self {
        Self::new(username, hasher.hash(password, &salt), salt)
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    username: String,
    salt: String,
    hash: String,
}

#[derive(Debug, Deserialize)]
struct UserTable {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Authenticator checking passwords against a user table.
///
/// Answers synchronously; never returns [`AuthPoll::Pending`].
#[derive(Debug)]
pub struct CredentialAuthenticator<H: PasswordHasher = Sha256Hasher> {
    users: Vec<User>,
    hasher: H,
}

impl CredentialAuthenticator<Sha256Hasher> {
    /// Create an authenticator using SHA-256.
    pub fn new(users: Vec<User>) -> Self {
        Self::with_hasher(users, Sha256Hasher::new())
    }

    /// Load users from a TOML document (hex-encoded salts and hashes).
    pub fn from_toml(source: &str) -> Result<Self, TerminalError> {
        let table: UserTable = toml::from_str(source)?;
        let users = table
            .users
            .into_iter()
            .map(|record| {
                Ok(User::new(
                    &record.username,
                    decode_field("hash", &record.hash)?,
                    decode_field("salt", &record.salt)?,
                ))
            })
            .collect::<Result<Vec<_>, TerminalError>>()?;
        Ok(Self::new(users))
    }
}

impl<H: PasswordHasher> CredentialAuthenticator<H> {
    /// Create an authenticator with a custom hasher.
    pub fn with_hasher(users: Vec<User>, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// Look up a user by exact name.
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    /// Known user names.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(|user| user.username.as_str())
    }

    /// Check `password` for `username`.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.find_user(username) {
            Some(user) => self
                .hasher
                .verify(password, &user.salt, &user.password_hash),
            None => false,
        }
    }
}

impl<H: PasswordHasher> Authenticator for CredentialAuthenticator<H> {
    fn authenticate(&self, user: &str, password: &str) -> Result<AuthPoll, EvalError> {
        if !self.verify(user, password) {
            debug!(user, "credentials rejected");
            return Ok(AuthPoll::Ready(None));
        }
        issue_token().map(|token| AuthPoll::Ready(Some(token)))
    }
}

/// Fresh random token, hex encoded.
fn issue_token() -> Result<String, EvalError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes)
        .map_err(|e| EvalError::new(format!("cannot generate token: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Decode a fixed-size hex field of a user record.
fn decode_field<const N: usize>(field: &str, text: &str) -> Result<[u8; N], TerminalError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(text.trim(), &mut out)
        .map_err(|e| TerminalError::Credentials(format!("{field}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CredentialAuthenticator {
        let hasher = Sha256Hasher::new();
        CredentialAuthenticator::new(vec![
            User::with_password("alice", "secret", [1u8; 16], &hasher),
            User::with_password("bob", "hunter2", [2u8; 16], &hasher),
        ])
    }

    #[test]
    fn test_find_user_is_case_sensitive() {
        let auth = table();
        assert!(auth.find_user("alice").is_some());
        assert!(auth.find_user("Alice").is_none());
        assert_eq!(auth.usernames().collect::<Vec<_>>(), ["alice", "bob"]);
    }

    #[test]
    fn test_correct_password_issues_token() {
        let auth = table();
        match auth.authenticate("alice", "secret") {
            Ok(AuthPoll::Ready(Some(token))) => {
                assert_eq!(token.len(), TOKEN_BYTES * 2);
                assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_tokens_are_fresh() {
        let auth = table();
        let first = auth.authenticate("bob", "hunter2").unwrap();
        let second = auth.authenticate("bob", "hunter2").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_password_and_unknown_user_rejected() {
        let auth = table();
        assert_eq!(auth.authenticate("alice", "hunter2"), Ok(AuthPoll::Ready(None)));
        assert_eq!(auth.authenticate("carol", "secret"), Ok(AuthPoll::Ready(None)));
    }

    #[test]
    fn test_from_toml() {
        let salt = [3u8; 16];
        let hash = Sha256Hasher::new().hash("pw", &salt);
        let source = format!(
            "[[users]]\nusername = \"ops\"\nsalt = \"{}\"\nhash = \"{}\"\n",
            hex::encode(salt),
            hex::encode(hash)
        );

        let auth = CredentialAuthenticator::from_toml(&source).unwrap();
        assert!(auth.verify("ops", "pw"));
        assert!(!auth.verify("ops", "PW"));
    }

    #[test]
    fn test_from_toml_rejects_bad_hex() {
        let source = "[[users]]\nusername = \"ops\"\nsalt = \"zz\"\nhash = \"00\"\n";
        assert!(matches!(
            CredentialAuthenticator::from_toml(source),
            Err(TerminalError::Credentials(_))
        ));
    }

    #[test]
    fn test_decode_field_checks_length() {
        assert_eq!(decode_field::<3>("salt", " 00ab10 ").unwrap(), [0x00, 0xab, 0x10]);
        match decode_field::<2>("hash", "00ab10") {
            Err(TerminalError::Credentials(message)) => assert!(message.starts_with("hash: ")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(decode_field::<1>("salt", "g0").is_err());
    }
}
