//! Compile-time and runtime configuration.
//!
//! The `ShellConfig` trait carries the fixed strings and timings of the
//! terminal without runtime overhead. `Settings` holds the per-terminal
//! options a host usually reads from a file.

use crate::error::TerminalError;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Capacity of each history ring.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Terminal configuration trait defining prompts, messages and timings.
///
/// All values are const (zero runtime cost).
pub trait ShellConfig {
    /// Prompt shown while waiting for a username (default: `login:`)
    const LOGIN_PROMPT: &'static str;

    /// Prompt shown while waiting for a password (default: `password:`)
    const PASSWORD_PROMPT: &'static str;

    /// Placeholder rendered for every character in mask mode (default: `*`)
    const MASK_CHAR: char;

    /// Reported when the authenticator rejects the credentials
    const MSG_LOGIN_FAILED: &'static str;

    /// Echoed when `exit` is used on the root frame without a login gate
    const MSG_CANNOT_EXIT: &'static str;

    /// Delay before a deferred focus change takes effect (default: 100 ms)
    const FOCUS_DELAY: Duration;
}

/// Default configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl ShellConfig for DefaultConfig {
    const LOGIN_PROMPT: &'static str = "login:";
    const PASSWORD_PROMPT: &'static str = "password:";
    const MASK_CHAR: char = '*';
    const MSG_LOGIN_FAILED: &'static str = "Wrong password, try again";
    const MSG_CANNOT_EXIT: &'static str = "You can't exit from main interpreter";
    const FOCUS_DELAY: Duration = Duration::from_millis(100);
}

/// Runtime options of one terminal instance.
///
/// Every field has a default, so a settings file only lists what it changes:
///
/// ```toml
/// name = "admin"
/// prompt = "admin>"
/// greetings = "Remote administration console"
/// persist = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the root frame (scopes history and stored credentials)
    pub name: String,

    /// Prompt of the root frame
    pub prompt: String,

    /// Greeting echoed when the root frame is activated
    pub greetings: Option<String>,

    /// Record submitted commands
    pub history: bool,

    /// Write history and credentials to the store
    pub persist: bool,

    /// Handle the built-in `exit` command
    pub exit: bool,

    /// Take the focus right after construction (see
    /// [`Registry::activate`](crate::registry::Registry::activate))
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: String::new(),
            prompt: String::from(">"),
            greetings: None,
            history: true,
            persist: true,
            exit: true,
            enabled: true,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, TerminalError> {
        Ok(toml::from_str(source)?)
    }
}
