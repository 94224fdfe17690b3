//! Test fixtures and utilities for repl-stack testing.
//!
//! Provides:
//! - `MockOutput`: Test implementation of the Output trait
//! - `CommandLog`: Interpreter that records what it receives
//! - `ScriptedAuth`: Authenticator with a fixed answer table

#![allow(dead_code)]

use repl_stack::{AuthPoll, Authenticator, BlockId, Console, EvalError, Frame, Output};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// ============================================================================
// MockOutput - Test Output Implementation
// ============================================================================

/// One call received by `MockOutput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Echo(BlockId, String),
    Error(BlockId, String),
    Clear,
    Pause,
    Resume,
    Scroll(i32),
}

/// Output collaborator that records every call.
#[derive(Debug, Default)]
pub struct MockOutput {
    events: Vec<Event>,
}

impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Text of echoed blocks in order.
    pub fn echoes(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Echo(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text of error blocks in order.
    pub fn errors(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Error(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Echo and error text in display order.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Echo(_, text) | Event::Error(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl Output for MockOutput {
    fn echo(&mut self, block: BlockId, text: &str) {
        self.events.push(Event::Echo(block, text.to_owned()));
    }

    fn error(&mut self, block: BlockId, text: &str) {
        self.events.push(Event::Error(block, text.to_owned()));
    }

    fn clear(&mut self) {
        self.events.push(Event::Clear);
    }

    fn pause(&mut self) {
        self.events.push(Event::Pause);
    }

    fn resume(&mut self) {
        self.events.push(Event::Resume);
    }

    fn scroll(&mut self, amount: i32) {
        self.events.push(Event::Scroll(amount));
    }
}

// ============================================================================
// CommandLog - Recording Interpreter
// ============================================================================

/// Shared list of commands an interpreter was given.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<String>>>);

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Frame whose interpreter records commands and echoes `ok: <command>`.
    ///
    /// `fail` makes it raise an error; `push <name>` pushes a nested frame
    /// recording into the same log.
    pub fn frame(&self) -> Frame {
        let log = self.clone();
        Frame::from_fn(move |command, console| log.evaluate(command, console))
    }

    fn evaluate(&self, command: &str, console: &mut dyn Console) -> Result<(), EvalError> {
        self.0.borrow_mut().push(command.to_owned());
        match command.split_once(' ') {
            _ if command == "fail" => Err(EvalError::new("command failed")),
            Some(("push", name)) => {
                let nested = self.frame().named(name).with_prompt(format!("{name}>"));
                console.push(nested)?;
                Ok(())
            }
            _ => {
                console.echo(&format!("ok: {command}"));
                Ok(())
            }
        }
    }
}

// ============================================================================
// ScriptedAuth - Table-driven Authenticator
// ============================================================================

/// Authenticator answering from a user/password table.
///
/// Users missing from the table are rejected. `slow` always answers
/// `Pending`; `broken` always fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAuth {
    accounts: Rc<HashMap<(String, String), String>>,
    calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl ScriptedAuth {
    pub fn new(accounts: &[(&str, &str, &str)]) -> Self {
        let accounts = accounts
            .iter()
            .map(|(user, password, token)| {
                ((user.to_string(), password.to_string()), token.to_string())
            })
            .collect();
        Self {
            accounts: Rc::new(accounts),
            calls: Rc::default(),
        }
    }

    /// Table holding only alice/secret -> tok123.
    pub fn alice() -> Self {
        Self::new(&[("alice", "secret", "tok123")])
    }

    /// Every (user, password) pair received.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl Authenticator for ScriptedAuth {
    fn authenticate(&self, user: &str, password: &str) -> Result<AuthPoll, EvalError> {
        self.calls
            .borrow_mut()
            .push((user.to_owned(), password.to_owned()));
        match user {
            "slow" => Ok(AuthPoll::Pending),
            "broken" => Err(EvalError::new("auth backend unreachable")),
            _ => Ok(AuthPoll::Ready(
                self.accounts
                    .get(&(user.to_owned(), password.to_owned()))
                    .cloned(),
            )),
        }
    }
}
