//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
mod fixtures;

pub use fixtures::{CommandLog, Event, MockOutput, ScriptedAuth};
use repl_stack::{FocusEvent, Frame, MemoryStore, Registry, Settings, Terminal, TerminalError};

pub type TestTerminal = Terminal<MockOutput, MemoryStore>;

// ============================================================================
// Terminal Creation Helpers
// ============================================================================

/// Settings used by most tests: root named `main`, prompt `>`.
pub fn test_settings() -> Settings {
    Settings {
        name: String::from("main"),
        ..Settings::default()
    }
}

/// Create a terminal around `root` with an empty store.
pub fn create_terminal(root: Frame) -> TestTerminal {
    create_terminal_with(test_settings(), root, MemoryStore::new())
}

/// Create a terminal with explicit settings and store.
///
/// The terminal takes the focus of its own registry when `settings.enabled`
/// is set.
pub fn create_terminal_with(settings: Settings, root: Frame, store: MemoryStore) -> TestTerminal {
    let mut registry = Registry::new();
    let id = registry.register();
    let enabled = settings.enabled;
    let mut terminal = Terminal::new(id, settings, root, MockOutput::new(), store).unwrap();
    if enabled {
        for event in registry.activate(id) {
            apply_focus(&mut terminal, event);
        }
    }
    terminal
}

/// Apply a registry event if it targets `terminal`.
pub fn apply_focus(terminal: &mut TestTerminal, event: FocusEvent) {
    match event {
        FocusEvent::Enable(id) if id == terminal.id() => terminal.focus(true),
        FocusEvent::Disable(id) if id == terminal.id() => terminal.focus(false),
        _ => {}
    }
}

/// Terminal whose root records into the returned log.
pub fn create_logged_terminal() -> (TestTerminal, CommandLog) {
    let log = CommandLog::new();
    let root = log.frame().named("main");
    (create_terminal(root), log)
}

/// Terminal whose root is gated by alice/secret -> tok123.
pub fn create_gated_terminal() -> (TestTerminal, CommandLog, ScriptedAuth) {
    let log = CommandLog::new();
    let auth = ScriptedAuth::alice();
    let root = log.frame().named("main").with_login(auth.clone());
    (create_terminal(root), log, auth)
}

// ============================================================================
// Input Helpers
// ============================================================================

/// Type `line` followed by Enter.
pub fn type_line(terminal: &mut TestTerminal, line: &str) -> Result<(), TerminalError> {
    terminal.process_str(line)?;
    terminal.process_char('\r')
}

/// Walk through the login prompts.
pub fn login(terminal: &mut TestTerminal, user: &str, password: &str) {
    type_line(terminal, user).unwrap();
    type_line(terminal, password).unwrap();
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Echoed text so far.
pub fn echoes(terminal: &TestTerminal) -> Vec<String> {
    terminal.output().echoes()
}

/// Reported errors so far.
pub fn errors(terminal: &TestTerminal) -> Vec<String> {
    terminal.output().errors()
}

/// Assert that `haystack` contains every string in `needles`.
pub fn assert_contains_all(haystack: &[String], needles: &[&str]) {
    for needle in needles {
        assert!(
            haystack.iter().any(|line| line.contains(needle)),
            "expected {needle:?} in {haystack:?}"
        );
    }
}
