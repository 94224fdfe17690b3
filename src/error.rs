//! Error types for terminal operations.
//!
//! `TerminalError` covers everything the core can report to its caller.
//! `EvalError` is what interpreters, text providers and authenticators
//! hand back when their own work fails.

use core::fmt;
use thiserror::Error;

/// Failure raised by user code running inside the terminal.
///
/// Interpreters, prompt/greeting providers and authenticators return this.
/// The terminal reports it through the output collaborator and then wraps
/// it in [`TerminalError::Eval`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    message: String,
}

impl EvalError {
    /// Create an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message shown to the user.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for EvalError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for EvalError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Call site an error was raised from.
///
/// Rendered as the bracketed label in front of reported errors
/// (`[USER]: ...`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    /// Interpreter of the active frame
    User,
    /// Authenticator of a login-gated frame
    Login,
    /// Greeting provider
    Greetings,
    /// Prompt provider
    Prompt,
}

impl ErrorSource {
    /// Upper-case label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            ErrorSource::User => "USER",
            ErrorSource::Login => "LOGIN",
            ErrorSource::Greetings => "GREETINGS",
            ErrorSource::Prompt => "PROMPT",
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which frame text failed validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextKind {
    /// Frame or terminal prompt
    Prompt,
    /// Frame greeting
    Greetings,
}

impl TextKind {
    /// Source label used when reporting a validation failure.
    pub fn source(self) -> ErrorSource {
        match self {
            TextKind::Prompt => ErrorSource::Prompt,
            TextKind::Greetings => ErrorSource::Greetings,
        }
    }
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextKind::Prompt => f.write_str("prompt"),
            TextKind::Greetings => f.write_str("greetings"),
        }
    }
}

/// Terminal error type.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// A prompt or greeting was rejected; the triggering operation was aborted.
    #[error("invalid {kind}: {reason}")]
    Validation {
        /// Which text was rejected
        kind: TextKind,
        /// Why it was rejected
        reason: String,
    },

    /// User code failed. Already reported on the terminal.
    #[error("[{origin}]: {error}")]
    Eval {
        /// Where the failure happened
        origin: ErrorSource,
        /// The failure itself
        #[source]
        error: EvalError,
    },

    /// `logout` called on a terminal whose root frame has no login gate.
    #[error("terminal has no login gate")]
    NoLoginGate,

    /// `complete_login` called while no authentication was outstanding.
    #[error("no login is awaiting an authenticator response")]
    NoPendingLogin,

    /// Settings or credential file could not be parsed.
    #[error("invalid settings: {0}")]
    Config(#[from] toml::de::Error),

    /// Credential table parsed but holds malformed values.
    #[error("invalid credentials: {0}")]
    Credentials(String),
}
