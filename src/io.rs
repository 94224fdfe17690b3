//! Output abstraction for the presentation layer.
//!
//! The `Output` trait is everything the core needs from whatever draws the
//! terminal: appending blocks of text, clearing, and hiding the command line
//! while asynchronous work is outstanding.

/// Handle of one displayed block of output.
///
/// Assigned by the terminal in display order, starting at 0. Hosts use it to
/// address a block after the fact (restyling, removal).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u64);

/// Presentation-layer collaborator.
///
/// Implementations render; the core never does. Calls are made synchronously
/// from inside terminal operations, so implementations should only buffer or
/// schedule drawing and must not call back into the terminal.
pub trait Output {
    /// Display `text` as a normal block.
    fn echo(&mut self, block: BlockId, text: &str);

    /// Display `text` as an error block.
    fn error(&mut self, block: BlockId, text: &str);

    /// Remove all displayed blocks.
    fn clear(&mut self);

    /// Hide the command line and stop showing input.
    fn pause(&mut self);

    /// Show the command line again.
    fn resume(&mut self);

    /// Scroll the output by `amount` lines (negative scrolls up).
    ///
    /// Default implementation does nothing.
    fn scroll(&mut self, amount: i32) {
        let _ = amount;
    }
}

impl<T: Output + ?Sized> Output for &mut T {
    fn echo(&mut self, block: BlockId, text: &str) {
        (**self).echo(block, text)
    }

    fn error(&mut self, block: BlockId, text: &str) {
        (**self).error(block, text)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn scroll(&mut self, amount: i32) {
        (**self).scroll(amount)
    }
}
