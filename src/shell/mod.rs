//! Terminal orchestration and command dispatch.
//!
//! The `Terminal` struct brings together the line buffer, history, frame
//! stack and login state machine. Hosts feed it characters or keys and it
//! drives the [`Output`] and [`Store`] collaborators in response.

use crate::auth::AuthPoll;
use crate::config::{DEFAULT_HISTORY_SIZE, DefaultConfig, Settings, ShellConfig};
use crate::error::{ErrorSource, EvalError, TerminalError, TextKind};
use crate::io::{BlockId, Output};
use crate::registry::TerminalId;
use crate::store::Store;
use core::marker::PhantomData;
use core::mem;
use tracing::{debug, info, warn};

// Sub-modules
pub mod decoder;
pub mod editor;
pub mod handler;
pub mod history;
pub mod login;
pub mod stack;

// Re-export key types
pub use decoder::{InputDecoder, Key};
pub use editor::LineBuffer;
pub use handler::{Console, Interpreter};
pub use history::History;
pub use login::LoginStage;
pub use stack::{Frame, InterpreterStack, Session, Text};

use login::{login_key, token_key};

/// One interactive terminal.
///
/// Generic over:
/// - `O`: presentation collaborator
/// - `S`: persistence collaborator
/// - `C`: compile-time strings and timings
///
/// Single-threaded: every operation runs to completion before the next one
/// starts. Asynchronous work is expressed with [`pause`](Terminal::pause) /
/// [`resume`](Terminal::resume) and [`complete_login`](Terminal::complete_login).
pub struct Terminal<O, S, C = DefaultConfig>
where
    O: Output,
    S: Store,
    C: ShellConfig,
{
    id: TerminalId,
    settings: Settings,
    output: O,
    store: S,

    /// Line being typed
    editor: LineBuffer,

    /// Escape sequence state machine
    decoder: InputDecoder,

    /// Commands of the active frame, at most `DEFAULT_HISTORY_SIZE`
    history: History<DEFAULT_HISTORY_SIZE>,

    stack: InterpreterStack,
    stage: LoginStage,

    /// Prompt currently shown (login prompts replace the frame's own)
    prompt: Text,

    paused: bool,
    focused: bool,
    next_block: u64,

    _config: PhantomData<C>,
}

impl<O, S, C> core::fmt::Debug for Terminal<O, S, C>
where
    O: Output,
    S: Store,
    C: ShellConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Terminal")
            .field("id", &self.id)
            .field("name", &self.settings.name)
            .field("depth", &self.stack.size())
            .field("stage", &self.stage)
            .field("line", &self.editor.display(C::MASK_CHAR))
            .field("paused", &self.paused)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Construction
// ============================================================================

impl<O: Output, S: Store> Terminal<O, S, DefaultConfig> {
    /// Create a terminal with the default configuration.
    ///
    /// See [`with_config`](Terminal::with_config).
    pub fn new(
        id: TerminalId,
        settings: Settings,
        root: Frame,
        output: O,
        store: S,
    ) -> Result<Self, TerminalError> {
        Self::with_config(id, settings, root, output, store)
    }
}

impl<O, S, C> Terminal<O, S, C>
where
    O: Output,
    S: Store,
    C: ShellConfig,
{
    /// Create a terminal and activate `root`.
    ///
    /// The terminal starts without focus; the host applies the events of
    /// [`Registry::activate`](crate::registry::Registry::activate) when
    /// [`Settings::enabled`] is set.
    ///
    /// A root frame with a login gate starts logged in when the store holds
    /// a token for it, otherwise at the username prompt. Without a gate the
    /// greeting (if any) is echoed. Fails when the root's prompt or greeting
    /// does not validate, or when its greeting fails to render.
    pub fn with_config(
        id: TerminalId,
        settings: Settings,
        root: Frame,
        output: O,
        store: S,
    ) -> Result<Self, TerminalError> {
        root.validate()?;

        let mut terminal = Self {
            id,
            focused: false,
            settings,
            output,
            store,
            editor: LineBuffer::new(),
            decoder: InputDecoder::new(),
            history: History::new(),
            prompt: root.prompt().clone(),
            stack: InterpreterStack::new(root),
            stage: LoginStage::Normal,
            paused: false,
            next_block: 0,
            _config: PhantomData,
        };

        info!(terminal = %id, name = %terminal.settings.name, "terminal created");
        if terminal.stack.root().has_login() {
            terminal.restore_session();
        }
        terminal.activate_top(true)?;
        Ok(terminal)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Decode one raw character and act on it.
    pub fn process_char(&mut self, c: char) -> Result<(), TerminalError> {
        let key = self.decoder.decode_char(c);
        self.handle_key(key)
    }

    /// Feed a run of raw characters.
    ///
    /// Stops at the first line whose dispatch fails.
    pub fn process_str(&mut self, input: &str) -> Result<(), TerminalError> {
        for c in input.chars() {
            self.process_char(c)?;
        }
        Ok(())
    }

    /// Act on a logical key.
    ///
    /// Ignored while paused or unfocused. `Enter` submits the line.
    pub fn handle_key(&mut self, key: Key) -> Result<(), TerminalError> {
        if !self.accepts_input() {
            if key != Key::None {
                debug!(terminal = %self.id, ?key, "input ignored");
            }
            return Ok(());
        }

        match key {
            Key::None => {}
            Key::Char(c) => self.editor.insert(c),
            Key::Enter => return self.submit(),
            Key::Backspace => self.editor.delete_before(),
            Key::Delete => self.editor.delete_after(),
            Key::Left => self.editor.move_left(),
            Key::Right => self.editor.move_right(),
            Key::WordLeft => self.editor.move_word_left(),
            Key::WordRight => self.editor.move_word_right(),
            Key::Home => self.editor.move_home(),
            Key::End => self.editor.move_end(),
            Key::HistoryPrevious => self.recall(true),
            Key::HistoryNext => self.recall(false),
            Key::ClearLine => self.editor.clear(),
            Key::KillToEnd => self.editor.kill_to_end(),
            Key::DeleteWord => self.editor.delete_word_after(),
            Key::Exit => {
                if self.settings.exit {
                    self.editor.clear();
                    self.exit_frame();
                }
            }
        }
        Ok(())
    }

    /// Insert `text` at the cursor.
    pub fn paste(&mut self, text: &str) {
        if self.accepts_input() {
            self.editor.paste(text);
        }
    }

    /// Submit the current line.
    ///
    /// Errors raised while handling it have already been reported on the
    /// terminal when they are returned.
    pub fn submit(&mut self) -> Result<(), TerminalError> {
        if !self.accepts_input() {
            debug!(terminal = %self.id, "submit ignored");
            return Ok(());
        }
        let command = self.editor.submit();
        self.dispatch(&command)
    }

    /// Run `line` as if it had been typed and submitted.
    ///
    /// Works without focus; ignored while paused.
    pub fn exec(&mut self, line: &str) -> Result<(), TerminalError> {
        if self.paused {
            debug!(terminal = %self.id, "exec ignored while paused");
            return Ok(());
        }
        self.dispatch(line.trim())
    }

    fn accepts_input(&self) -> bool {
        self.focused && !self.paused
    }

    fn recall(&mut self, older: bool) {
        if self.stage.is_active() || !self.history.is_enabled() {
            return;
        }
        let entry = if older {
            self.history.previous()
        } else {
            self.history.next()
        }
        .to_owned();
        self.editor.set_text(&entry);
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&mut self, command: &str) -> Result<(), TerminalError> {
        match self.stage {
            LoginStage::Normal => self.evaluate(command),
            LoginStage::AwaitingUsername => self.accept_username(command),
            LoginStage::AwaitingPassword { .. } => self.accept_password(command),
            LoginStage::Authenticating { .. } => {
                debug!(terminal = %self.id, "line ignored while authenticating");
                Ok(())
            }
        }
    }

    fn evaluate(&mut self, command: &str) -> Result<(), TerminalError> {
        self.history.append(command, &mut self.store);
        self.echo_command(command)?;

        if self.settings.exit && command == "exit" {
            self.exit_frame();
            return Ok(());
        }

        debug!(terminal = %self.id, depth = self.stack.size(), command, "evaluate");
        let interpreter = self.stack.top().interpreter();
        match interpreter.evaluate(command, self) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.report(ErrorSource::User, error)),
        }
    }

    /// Echo the submitted line after the prompt, masked if needed.
    fn echo_command(&mut self, command: &str) -> Result<(), TerminalError> {
        let prompt = match self.prompt.render() {
            Ok(prompt) => prompt,
            Err(error) => return Err(self.report(ErrorSource::Prompt, error)),
        };
        let shown: String = if self.editor.is_masked() {
            command.chars().map(|_| C::MASK_CHAR).collect()
        } else {
            command.to_owned()
        };
        self.echo(&format!("{prompt} {shown}"));
        Ok(())
    }

    /// `exit` command and Ctrl+D.
    fn exit_frame(&mut self) {
        if self.stack.size() == 1 && !self.stack.root().has_login() {
            self.echo(C::MSG_CANNOT_EXIT);
        } else {
            self.pop();
        }
    }

    fn report(&mut self, origin: ErrorSource, error: EvalError) -> TerminalError {
        self.error(&format!("[{origin}]: {error}"));
        warn!(terminal = %self.id, %origin, %error, "evaluation failed");
        TerminalError::Eval { origin, error }
    }

    fn report_validation(&mut self, err: TerminalError) -> TerminalError {
        if let TerminalError::Validation { kind, reason } = &err {
            let label = kind.source();
            self.error(&format!("[{label}]: {reason}"));
        }
        warn!(terminal = %self.id, error = %err, "validation failed");
        err
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Push `frame` and make it active.
    ///
    /// A login-gated frame without a stored session starts at the username
    /// prompt instead. On validation failure the stack is left untouched and
    /// only the error is reported.
    pub fn push(&mut self, frame: Frame) -> Result<(), TerminalError> {
        if let Err(err) = frame.validate() {
            return Err(self.report_validation(err));
        }
        debug!(terminal = %self.id, frame = %frame.name(), depth = self.stack.size() + 1, "push");
        self.stack.push(frame);
        self.activate_top(true)
    }

    /// Pop the active frame and re-activate the one below (no greeting).
    ///
    /// At the root nothing is popped: a login-gated root logs out, any other
    /// root is left alone.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.stack.size() == 1 {
            if self.stack.root().has_login() {
                self.start_logout();
            } else {
                debug!(terminal = %self.id, "root frame cannot be popped");
            }
            return None;
        }

        let frame = self.stack.pop()?;
        if frame.has_login() {
            self.forget_credentials(frame.name());
        }
        debug!(terminal = %self.id, frame = %frame.name(), depth = self.stack.size(), "pop");
        self.enter_top();
        Some(frame)
    }

    /// Make the top frame current, echoing its greeting when `greet` is set.
    fn activate_top(&mut self, greet: bool) -> Result<(), TerminalError> {
        if !self.enter_top() || !greet {
            return Ok(());
        }
        if let Some(greeting) = self.stack.top().greeting().cloned() {
            match greeting.render() {
                Ok(text) => {
                    self.echo(&text);
                }
                Err(error) => return Err(self.report(ErrorSource::Greetings, error)),
            }
        }
        Ok(())
    }

    /// Bind history and prompt to the top frame.
    ///
    /// Returns `false` when the frame needs a login first (the login flow has
    /// been started instead).
    fn enter_top(&mut self) -> bool {
        if self.stack.top().has_login() && self.stack.top_session().is_none() {
            self.start_login();
            return false;
        }

        let name = self.stack.top().name().to_owned();
        self.bind_history(&name);
        if self.settings.history {
            self.history.enable();
        } else {
            self.history.disable();
        }
        self.prompt = self.stack.top().prompt().clone();
        self.editor.clear();
        self.editor.set_mask(false);
        self.stage = LoginStage::Normal;
        true
    }

    fn bind_history(&mut self, frame_name: &str) {
        let scope = if frame_name.is_empty() {
            self.id.to_string()
        } else {
            format!("{frame_name}_{}", self.id)
        };
        self.history.bind(&scope, &self.store, self.settings.persist);
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Pick up a persisted session for the root frame.
    fn restore_session(&mut self) -> bool {
        if !self.settings.persist {
            return false;
        }
        let name = self.stack.top().name().to_owned();
        match (
            self.store.get(&token_key(&name)),
            self.store.get(&login_key(&name)),
        ) {
            (Some(token), Some(user)) if !token.is_empty() => {
                debug!(terminal = %self.id, frame = %name, user = %user, "session restored");
                self.stack.set_top_session(Some(Session { user, token }));
                true
            }
            _ => false,
        }
    }

    fn start_login(&mut self) {
        let name = self.stack.top().name().to_owned();
        self.bind_history(&name);
        self.history.disable();
        self.prompt = Text::literal(C::LOGIN_PROMPT);
        self.editor.clear();
        self.editor.set_mask(false);
        self.stage = LoginStage::AwaitingUsername;
        debug!(terminal = %self.id, frame = %name, "awaiting login");
    }

    fn accept_username(&mut self, user: &str) -> Result<(), TerminalError> {
        self.echo_command(user)?;
        if user.is_empty() {
            return Ok(());
        }
        self.stage = LoginStage::AwaitingPassword {
            user: user.to_owned(),
        };
        self.prompt = Text::literal(C::PASSWORD_PROMPT);
        self.editor.set_mask(true);
        Ok(())
    }

    fn accept_password(&mut self, password: &str) -> Result<(), TerminalError> {
        self.echo_command(password)?;
        let user = match mem::take(&mut self.stage) {
            LoginStage::AwaitingPassword { user } => user,
            other => {
                self.stage = other;
                return Ok(());
            }
        };
        self.editor.set_mask(false);

        let Some(authenticator) = self.stack.top().authenticator() else {
            self.start_login();
            return Ok(());
        };

        self.stage = LoginStage::Authenticating { user: user.clone() };
        self.pause();
        match authenticator.authenticate(&user, password) {
            Ok(AuthPoll::Ready(token)) => self.finish_login(token),
            Ok(AuthPoll::Pending) => {
                debug!(terminal = %self.id, user = %user, "authentication pending");
                Ok(())
            }
            Err(error) => {
                let err = self.report(ErrorSource::Login, error);
                self.start_login();
                self.resume();
                Err(err)
            }
        }
    }

    /// Deliver the answer of an authenticator that returned
    /// [`AuthPoll::Pending`]: a token on success, `None` on rejection.
    pub fn complete_login(&mut self, token: Option<String>) -> Result<(), TerminalError> {
        if !matches!(self.stage, LoginStage::Authenticating { .. }) {
            return Err(TerminalError::NoPendingLogin);
        }
        self.finish_login(token)
    }

    fn finish_login(&mut self, token: Option<String>) -> Result<(), TerminalError> {
        let user = match mem::take(&mut self.stage) {
            LoginStage::Authenticating { user } => user,
            other => {
                self.stage = other;
                return Err(TerminalError::NoPendingLogin);
            }
        };
        self.resume();

        match token.filter(|token| !token.is_empty()) {
            Some(token) => {
                let name = self.stack.top().name().to_owned();
                if self.settings.persist {
                    self.store.set(&token_key(&name), &token);
                    self.store.set(&login_key(&name), &user);
                }
                info!(terminal = %self.id, frame = %name, user = %user, "logged in");
                self.stack.set_top_session(Some(Session { user, token }));
                self.activate_top(true)
            }
            None => {
                warn!(terminal = %self.id, user = %user, "login rejected");
                self.error(C::MSG_LOGIN_FAILED);
                self.start_login();
                Ok(())
            }
        }
    }

    /// Log the root frame out.
    ///
    /// Drops every frame above the root, forgets the session and any stored
    /// credentials, and returns to the username prompt.
    pub fn logout(&mut self) -> Result<(), TerminalError> {
        if !self.stack.root().has_login() {
            return Err(TerminalError::NoLoginGate);
        }
        self.start_logout();
        Ok(())
    }

    fn start_logout(&mut self) {
        let gated: Vec<String> = self
            .stack
            .frames()
            .filter(|frame| frame.has_login())
            .map(|frame| frame.name().to_owned())
            .collect();
        for name in gated {
            self.remove_credentials(&name);
        }
        let dropped = self.stack.truncate_to_root();
        self.stack.set_top_session(None);
        info!(terminal = %self.id, dropped, "logged out");
        self.start_login();
        self.resume();
    }

    /// Drop the stored credentials of a popped frame, unless they are the
    /// root's own.
    fn forget_credentials(&mut self, name: &str) {
        if self.stack.root().has_login() && self.stack.root().name() == name {
            return;
        }
        self.remove_credentials(name);
    }

    fn remove_credentials(&mut self, name: &str) {
        if self.settings.persist {
            self.store.remove(&token_key(name));
            self.store.remove(&login_key(name));
        }
    }

    /// Token of the innermost logged-in frame.
    pub fn token(&self) -> Option<String> {
        self.stack.session().map(|session| session.token.clone())
    }

    /// User name of the innermost logged-in frame.
    pub fn login_name(&self) -> Option<String> {
        self.stack.session().map(|session| session.user.clone())
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn next_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    /// Display a block of text.
    pub fn echo(&mut self, text: &str) -> BlockId {
        let block = self.next_block();
        self.output.echo(block, text);
        block
    }

    /// Display a block of text as an error.
    pub fn error(&mut self, text: &str) -> BlockId {
        let block = self.next_block();
        self.output.error(block, text);
        block
    }

    /// Remove all output and the current line.
    pub fn clear(&mut self) {
        self.output.clear();
        self.editor.clear();
    }

    /// Scroll the output.
    pub fn scroll(&mut self, amount: i32) {
        self.output.scroll(amount);
    }

    /// Stop accepting input and hide the line until [`resume`](Terminal::resume).
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.output.pause();
        }
    }

    /// Accept input again.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.output.resume();
        }
    }

    /// Whether input is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Enable or disable keyboard input (driven by the focus registry).
    pub fn focus(&mut self, enable: bool) {
        if self.focused != enable {
            debug!(terminal = %self.id, enable, "focus");
        }
        self.focused = enable;
    }

    /// Whether keyboard input is enabled.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Replace the prompt currently shown.
    ///
    /// The frame keeps its own prompt, which comes back when the frame is
    /// re-activated.
    pub fn set_prompt(&mut self, prompt: Text) -> Result<(), TerminalError> {
        if let Err(err) = prompt.validate(TextKind::Prompt) {
            return Err(self.report_validation(err));
        }
        self.prompt = prompt;
        Ok(())
    }

    /// Render the current prompt.
    pub fn prompt(&self) -> Result<String, EvalError> {
        self.prompt.render()
    }

    /// Line as it should be drawn (masked while a password is typed).
    pub fn display_line(&self) -> String {
        self.editor.display(C::MASK_CHAR)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Terminal identity.
    pub fn id(&self) -> TerminalId {
        self.id
    }

    /// Terminal name (from settings).
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Settings the terminal was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.stack.size()
    }

    /// Active frame.
    pub fn top(&self) -> &Frame {
        self.stack.top()
    }

    /// Login flow stage.
    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    /// Line buffer.
    pub fn editor(&self) -> &LineBuffer {
        &self.editor
    }

    /// History of the active frame.
    pub fn history(&self) -> &History<DEFAULT_HISTORY_SIZE> {
        &self.history
    }

    /// Presentation collaborator.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Presentation collaborator (mutable).
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Persistence collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<O, S, C> Console for Terminal<O, S, C>
where
    O: Output,
    S: Store,
    C: ShellConfig,
{
    fn echo(&mut self, text: &str) -> BlockId {
        Terminal::echo(self, text)
    }

    fn error(&mut self, text: &str) -> BlockId {
        Terminal::error(self, text)
    }

    fn clear(&mut self) {
        Terminal::clear(self)
    }

    fn pause(&mut self) {
        Terminal::pause(self)
    }

    fn resume(&mut self) {
        Terminal::resume(self)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn push(&mut self, frame: Frame) -> Result<(), TerminalError> {
        Terminal::push(self, frame)
    }

    fn pop(&mut self) -> Option<Frame> {
        Terminal::pop(self)
    }

    fn set_prompt(&mut self, prompt: Text) -> Result<(), TerminalError> {
        Terminal::set_prompt(self, prompt)
    }

    fn logout(&mut self) -> Result<(), TerminalError> {
        Terminal::logout(self)
    }

    fn token(&self) -> Option<String> {
        Terminal::token(self)
    }

    fn login_name(&self) -> Option<String> {
        Terminal::login_name(self)
    }

    fn depth(&self) -> usize {
        self.stack.size()
    }

    fn name(&self) -> &str {
        &self.settings.name
    }
}
