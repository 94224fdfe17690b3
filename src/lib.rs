//! # repl-stack
//!
//! Interactive line-editing terminal engine with a stack of nested
//! interpreters.
//!
//! **Key features:**
//! - **Line editing** - Cursor movement, word motion, kill/paste, masked input
//! - **History** - Per-frame command history with cyclic navigation, optionally persisted
//! - **Interpreter stack** - Push sub-interpreters with their own prompt and greeting; `exit` pops
//! - **Login gates** - Username/password flow in front of any frame, with stored tokens
//! - **Focus registry** - Many terminals, one keyboard
//!
//! The engine renders nothing itself: hosts implement [`Output`] to draw and
//! [`Store`] to persist, then feed keystrokes to a [`Terminal`].
//!
//! ## Optional Features
//!
//! - `authentication` - Password hashing and a credential-table authenticator
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut registry = Registry::new();
//! let root = Frame::root(&settings, |command: &str, console: &mut dyn Console| {
//!     console.echo(&format!("you said {command}"));
//!     Ok(())
//! });
//! let id = registry.register();
//! let mut terminal = Terminal::new(id, settings, root, output, MemoryStore::new())?;
//! for event in registry.activate(id) {
//!     terminal.focus(matches!(event, FocusEvent::Enable(_)));
//! }
//! terminal.process_str("hello\r")?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::result_large_err)]

// ============================================================================
// Module Declarations
// ============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod io;
pub mod registry;
pub mod shell;
pub mod store;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Collaborators
pub use io::{BlockId, Output};
pub use store::{MemoryStore, Store};

// Configuration
pub use config::{DefaultConfig, Settings, ShellConfig};

// Error types
pub use error::{ErrorSource, EvalError, TerminalError, TextKind};

// Authentication
pub use auth::{AuthPoll, Authenticator};

#[cfg(feature = "authentication")]
pub use auth::{CredentialAuthenticator, PasswordHasher, Sha256Hasher, User};

// Terminal types
pub use registry::{FocusEvent, FocusEvents, Registry, TerminalId};
pub use shell::{Console, Frame, Interpreter, Key, LineBuffer, LoginStage, Session, Terminal, Text};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
