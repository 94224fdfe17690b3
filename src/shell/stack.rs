//! Interpreter frames and the stack that owns them.
//!
//! A [`Frame`] bundles an interpreter with its prompt, optional greeting and
//! optional login gate. The [`InterpreterStack`] always holds the root frame;
//! only its top frame is active.

use crate::auth::Authenticator;
use crate::config::Settings;
use crate::error::{EvalError, TerminalError, TextKind};
use crate::shell::handler::{Console, Interpreter};
use core::fmt;
use std::rc::Rc;

/// Prompt or greeting text: fixed, or produced on demand.
#[derive(Clone)]
pub enum Text {
    /// Fixed string
    Literal(String),
    /// Callback rendered each time the text is shown
    Provider(Rc<dyn Fn() -> Result<String, EvalError>>),
}

impl Text {
    /// Fixed text.
    pub fn literal(text: impl Into<String>) -> Self {
        Text::Literal(text.into())
    }

    /// Text produced by `provider` each time it is shown.
    pub fn provider<F>(provider: F) -> Self
    where
        F: Fn() -> Result<String, EvalError> + 'static,
    {
        Text::Provider(Rc::new(provider))
    }

    /// Resolve to the string to display.
    pub fn render(&self) -> Result<String, EvalError> {
        match self {
            Text::Literal(text) => Ok(text.clone()),
            Text::Provider(provider) => provider(),
        }
    }

    /// Check the text can be shown as `kind`.
    ///
    /// Greetings are accepted as given: a greeting provider only runs when
    /// the greeting is played. Prompts are rendered once and must be a
    /// single line.
    pub fn validate(&self, kind: TextKind) -> Result<(), TerminalError> {
        if kind == TextKind::Greetings {
            return Ok(());
        }

        let rendered = self.render().map_err(|e| TerminalError::Validation {
            kind,
            reason: e.to_string(),
        })?;

        if kind == TextKind::Prompt && rendered.contains(|c| c == '\n' || c == '\r') {
            return Err(TerminalError::Validation {
                kind,
                reason: "prompt must be a single line".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Text::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Text::Provider(_) => f.write_str("Provider(<fn>)"),
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::literal(text)
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Literal(text)
    }
}

/// One interpreter context.
#[derive(Clone)]
pub struct Frame {
    name: String,
    interpreter: Rc<dyn Interpreter>,
    prompt: Text,
    greeting: Option<Text>,
    login: Option<Rc<dyn Authenticator>>,
}

impl Frame {
    /// Create an unnamed frame with prompt `>` and no greeting.
    pub fn new<I: Interpreter + 'static>(interpreter: I) -> Self {
        Self {
            name: String::new(),
            interpreter: Rc::new(interpreter),
            prompt: Text::literal(">"),
            greeting: None,
            login: None,
        }
    }

    /// Create a frame from a closure.
    ///
    /// Same as [`Frame::new`], but lets the compiler infer the closure's
    /// argument types.
    pub fn from_fn<F>(interpreter: F) -> Self
    where
        F: Fn(&str, &mut dyn Console) -> Result<(), EvalError> + 'static,
    {
        Self::new(interpreter)
    }

    /// Root frame described by `settings`.
    pub fn root<I: Interpreter + 'static>(settings: &Settings, interpreter: I) -> Self {
        let frame = Self::new(interpreter)
            .named(&settings.name)
            .with_prompt(settings.prompt.as_str());
        match &settings.greetings {
            Some(greetings) => frame.with_greeting(greetings.as_str()),
            None => frame,
        }
    }

    /// Builder method to set the frame name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Builder method to set the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<Text>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Builder method to set the greeting.
    pub fn with_greeting(mut self, greeting: impl Into<Text>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    /// Builder method to gate the frame behind `authenticator`.
    pub fn with_login<A: Authenticator + 'static>(self, authenticator: A) -> Self {
        self.with_shared_login(Rc::new(authenticator))
    }

    /// Builder method to gate the frame behind an authenticator shared with
    /// other frames.
    pub fn with_shared_login(mut self, authenticator: Rc<dyn Authenticator>) -> Self {
        self.login = Some(authenticator);
        self
    }

    /// Frame name (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prompt shown while the frame is active.
    pub fn prompt(&self) -> &Text {
        &self.prompt
    }

    /// Greeting played on activation.
    pub fn greeting(&self) -> Option<&Text> {
        self.greeting.as_ref()
    }

    /// Whether the frame requires a login.
    pub fn has_login(&self) -> bool {
        self.login.is_some()
    }

    pub(crate) fn interpreter(&self) -> Rc<dyn Interpreter> {
        Rc::clone(&self.interpreter)
    }

    pub(crate) fn authenticator(&self) -> Option<Rc<dyn Authenticator>> {
        self.login.clone()
    }

    /// Validate prompt and greeting.
    pub fn validate(&self) -> Result<(), TerminalError> {
        self.prompt.validate(TextKind::Prompt)?;
        if let Some(greeting) = &self.greeting {
            greeting.validate(TextKind::Greetings)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("greeting", &self.greeting)
            .field("login", &self.login.is_some())
            .finish_non_exhaustive()
    }
}

/// Authenticated session of a login-gated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Name the user logged in with
    pub user: String,
    /// Opaque credential returned by the authenticator
    pub token: String,
}

#[derive(Debug)]
struct Entry {
    frame: Frame,
    session: Option<Session>,
}

impl Entry {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            session: None,
        }
    }
}

/// Stack of frames. Never empty: the root cannot be popped.
#[derive(Debug)]
pub struct InterpreterStack {
    root: Entry,
    above: Vec<Entry>,
}

impl InterpreterStack {
    /// Create a stack holding only `root`.
    pub fn new(root: Frame) -> Self {
        Self {
            root: Entry::new(root),
            above: Vec::new(),
        }
    }

    /// Put `frame` on top.
    pub fn push(&mut self, frame: Frame) {
        self.above.push(Entry::new(frame));
    }

    /// Remove the top frame. Refused (returns `None`) at the root.
    pub fn pop(&mut self) -> Option<Frame> {
        self.above.pop().map(|entry| entry.frame)
    }

    /// Drop every frame above the root. Returns how many were dropped.
    pub fn truncate_to_root(&mut self) -> usize {
        let dropped = self.above.len();
        self.above.clear();
        dropped
    }

    /// Active frame.
    pub fn top(&self) -> &Frame {
        &self.top_entry().frame
    }

    /// Bottom frame.
    pub fn root(&self) -> &Frame {
        &self.root.frame
    }

    /// Depth (at least 1).
    pub fn size(&self) -> usize {
        self.above.len() + 1
    }

    /// Session of the active frame.
    pub fn top_session(&self) -> Option<&Session> {
        self.top_entry().session.as_ref()
    }

    /// Set or clear the session of the active frame.
    pub fn set_top_session(&mut self, session: Option<Session>) {
        match self.above.last_mut() {
            Some(entry) => entry.session = session,
            None => self.root.session = session,
        }
    }

    /// Session of the innermost logged-in frame.
    pub fn session(&self) -> Option<&Session> {
        self.above
            .iter()
            .rev()
            .chain(core::iter::once(&self.root))
            .find_map(|entry| entry.session.as_ref())
    }

    /// Frames from the root up.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        core::iter::once(&self.root)
            .chain(self.above.iter())
            .map(|entry| &entry.frame)
    }

    fn top_entry(&self) -> &Entry {
        self.above.last().unwrap_or(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(_: &str, _: &mut dyn Console) -> Result<(), EvalError> {
        Ok(())
    }

    fn noop() -> Frame {
        Frame::new(quiet)
    }

    #[test]
    fn test_text_render() {
        assert_eq!(Text::literal("> ").render().unwrap(), "> ");
        let text = Text::provider(|| Ok(String::from("dyn>")));
        assert_eq!(text.render().unwrap(), "dyn>");
    }

    #[test]
    fn test_text_validation() {
        assert!(Text::literal("ok>").validate(TextKind::Prompt).is_ok());
        assert!(matches!(
            Text::literal("two\nlines").validate(TextKind::Prompt),
            Err(TerminalError::Validation {
                kind: TextKind::Prompt,
                ..
            })
        ));
        // Greetings may span lines
        assert!(Text::literal("two\nlines").validate(TextKind::Greetings).is_ok());

        let failing = Text::provider(|| Err(EvalError::new("no data")));
        match failing.validate(TextKind::Prompt) {
            Err(TerminalError::Validation { kind, reason }) => {
                assert_eq!(kind, TextKind::Prompt);
                assert_eq!(reason, "no data");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_greeting_validation_does_not_render() {
        let calls = Rc::new(core::cell::Cell::new(0));
        let counter = Rc::clone(&calls);
        let greeting = Text::provider(move || {
            counter.set(counter.get() + 1);
            Err(EvalError::new("not yet"))
        });

        assert!(greeting.validate(TextKind::Greetings).is_ok());
        assert!(noop().with_greeting(greeting).validate().is_ok());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_frame_builder() {
        let frame = noop()
            .named("calc")
            .with_prompt("calc>")
            .with_greeting("Calculator");
        assert_eq!(frame.name(), "calc");
        assert_eq!(frame.prompt().render().unwrap(), "calc>");
        assert_eq!(frame.greeting().unwrap().render().unwrap(), "Calculator");
        assert!(!frame.has_login());
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_root_frame_from_settings() {
        let settings = Settings {
            name: String::from("main"),
            prompt: String::from("$"),
            greetings: Some(String::from("hi")),
            ..Settings::default()
        };
        let frame = Frame::root(&settings, quiet);
        assert_eq!(frame.name(), "main");
        assert_eq!(frame.prompt().render().unwrap(), "$");
        assert_eq!(frame.greeting().unwrap().render().unwrap(), "hi");
    }

    #[test]
    fn test_stack_push_pop() {
        let mut stack = InterpreterStack::new(noop().named("root"));
        assert_eq!(stack.size(), 1);
        assert!(stack.pop().is_none());

        stack.push(noop().named("a"));
        stack.push(noop().named("b"));
        assert_eq!(stack.size(), 3);
        assert_eq!(stack.top().name(), "b");
        assert_eq!(stack.root().name(), "root");

        let popped = stack.pop().unwrap();
        assert_eq!(popped.name(), "b");
        assert_eq!(stack.top().name(), "a");

        let names: Vec<_> = stack.frames().map(|f| f.name().to_owned()).collect();
        assert_eq!(names, ["root", "a"]);

        assert_eq!(stack.truncate_to_root(), 1);
        assert_eq!(stack.size(), 1);
    }

    #[test]
    fn test_sessions() {
        let mut stack = InterpreterStack::new(noop());
        stack.set_top_session(Some(Session {
            user: "alice".into(),
            token: "t1".into(),
        }));
        stack.push(noop());
        assert!(stack.top_session().is_none());
        assert_eq!(stack.session().unwrap().user, "alice");

        stack.set_top_session(Some(Session {
            user: "bob".into(),
            token: "t2".into(),
        }));
        assert_eq!(stack.session().unwrap().token, "t2");

        stack.pop();
        assert_eq!(stack.session().unwrap().token, "t1");
    }
}
