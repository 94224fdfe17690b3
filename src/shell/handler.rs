//! Interpreter trait and the console surface interpreters drive.
//!
//! An [`Interpreter`] is the evaluator of one frame. It receives each
//! submitted command together with a [`Console`], the object-safe view of
//! the terminal it runs in, and may echo output, pause for asynchronous work,
//! or push and pop frames through it.

use crate::error::{EvalError, TerminalError};
use crate::io::BlockId;
use crate::shell::stack::{Frame, Text};

/// Evaluator of one interpreter frame.
///
/// Implemented for any `Fn(&str, &mut dyn Console) -> Result<(), EvalError>`.
///
/// # Example
///
/// ```rust,ignore
/// struct Calculator;
///
/// impl Interpreter for Calculator {
///     fn evaluate(&self, command: &str, console: &mut dyn Console) -> Result<(), EvalError> {
///         let sum: i64 = command
///             .split_whitespace()
///             .map(|n| n.parse::<i64>().map_err(|e| EvalError::new(e.to_string())))
///             .sum::<Result<_, _>>()?;
///         console.echo(&sum.to_string());
///         Ok(())
///     }
/// }
/// ```
pub trait Interpreter {
    /// Evaluate one trimmed command.
    ///
    /// An `Err` is reported on the terminal with the `USER` label and then
    /// returned to whoever submitted the line.
    fn evaluate(&self, command: &str, console: &mut dyn Console) -> Result<(), EvalError>;
}

impl<F> Interpreter for F
where
    F: Fn(&str, &mut dyn Console) -> Result<(), EvalError>,
{
    fn evaluate(&self, command: &str, console: &mut dyn Console) -> Result<(), EvalError> {
        self(command, console)
    }
}

/// Terminal operations available to interpreters and glue code.
pub trait Console {
    /// Display a block of text.
    fn echo(&mut self, text: &str) -> BlockId;

    /// Display a block of text as an error.
    fn error(&mut self, text: &str) -> BlockId;

    /// Remove all output and the current line.
    fn clear(&mut self);

    /// Stop accepting input until [`resume`](Console::resume).
    fn pause(&mut self);

    /// Accept input again.
    fn resume(&mut self);

    /// Whether input is suspended.
    fn is_paused(&self) -> bool;

    /// Push a frame, making it active (or starting its login).
    fn push(&mut self, frame: Frame) -> Result<(), TerminalError>;

    /// Pop the active frame. `None` at the root.
    fn pop(&mut self) -> Option<Frame>;

    /// Replace the prompt currently shown (the frame keeps its own).
    fn set_prompt(&mut self, prompt: Text) -> Result<(), TerminalError>;

    /// End the root session and return to the login prompt.
    fn logout(&mut self) -> Result<(), TerminalError>;

    /// Credential token of the innermost logged-in frame.
    fn token(&self) -> Option<String>;

    /// User name of the innermost logged-in frame.
    fn login_name(&self) -> Option<String>;

    /// Number of frames on the stack (at least 1).
    fn depth(&self) -> usize;

    /// Terminal name (the root frame's name).
    fn name(&self) -> &str;
}

impl From<TerminalError> for EvalError {
    fn from(err: TerminalError) -> Self {
        EvalError::new(err.to_string())
    }
}
