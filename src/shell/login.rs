//! Login state machine stages and credential storage keys.

/// Where a terminal is in the login flow.
///
/// ```text
/// Normal ──logout──▶ AwaitingUsername ──user──▶ AwaitingPassword
///    ▲                    ▲     ▲                     │ password
///    │                    │     └──rejected/error──┐  ▼
///    └─────────token──────┴────────────────── Authenticating
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginStage {
    /// Commands go to the active interpreter
    #[default]
    Normal,

    /// Next line is taken as the user name
    AwaitingUsername,

    /// Next line is taken as the password (masked)
    AwaitingPassword {
        /// Name entered in the previous step
        user: String,
    },

    /// Authenticator consulted; input paused until it answers
    Authenticating {
        /// Name being authenticated
        user: String,
    },
}

impl LoginStage {
    /// Whether submitted lines are routed to the login flow.
    pub fn is_active(&self) -> bool {
        !matches!(self, LoginStage::Normal)
    }

    /// User being logged in, once entered.
    pub fn user(&self) -> Option<&str> {
        match self {
            LoginStage::AwaitingPassword { user } | LoginStage::Authenticating { user } => {
                Some(user)
            }
            _ => None,
        }
    }
}

/// Store key of the persisted token for frame `name`.
pub fn token_key(name: &str) -> String {
    scoped_key("token", name)
}

/// Store key of the persisted login name for frame `name`.
pub fn login_key(name: &str) -> String {
    scoped_key("login", name)
}

fn scoped_key(kind: &str, name: &str) -> String {
    if name.is_empty() {
        kind.to_owned()
    } else {
        format!("{kind}_{name}")
    }
}
