//! Registry of live terminals and keyboard focus.
//!
//! At most one terminal has focus. Some transitions take effect after
//! [`ShellConfig::FOCUS_DELAY`](crate::config::ShellConfig::FOCUS_DELAY) so
//! that a blur immediately followed by a focus elsewhere does not flicker;
//! hosts drive those with [`Registry::poll`].

use crate::config::{DefaultConfig, ShellConfig};
use core::fmt;
use core::time::Duration;
use std::time::Instant;
use tracing::debug;

/// Identity of one terminal instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(u32);

impl TerminalId {
    /// Wrap a raw id.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Focus change the host must apply (`Terminal::focus`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    /// Enable keyboard input on the terminal
    Enable(TerminalId),
    /// Disable keyboard input on the terminal
    Disable(TerminalId),
}

/// Events produced synchronously by one focus request.
pub type FocusEvents = heapless::Vec<FocusEvent, 2>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Deferred {
    /// Enable or disable the single registered terminal
    Toggle(TerminalId, bool),
    /// Move focus to the next terminal and enable it
    Rotate,
}

/// Live terminals in creation order, with a cursor on the focused one.
#[derive(Debug)]
pub struct Registry {
    terminals: Vec<TerminalId>,
    front: usize,
    next_id: u32,
    delay: Duration,
    pending: Option<(Instant, Deferred)>,
}

impl Registry {
    /// Create an empty registry with the default focus delay.
    pub fn new() -> Self {
        Self::with_delay(DefaultConfig::FOCUS_DELAY)
    }

    /// Create an empty registry using `C`'s focus delay.
    pub fn with_config<C: ShellConfig>() -> Self {
        Self::with_delay(C::FOCUS_DELAY)
    }

    /// Create an empty registry with an explicit focus delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            terminals: Vec::new(),
            front: 0,
            next_id: 0,
            delay,
            pending: None,
        }
    }

    /// Allocate an id and register it. The first terminal becomes the
    /// front one.
    pub fn register(&mut self) -> TerminalId {
        let id = TerminalId(self.next_id);
        self.next_id += 1;
        self.terminals.push(id);
        debug!(terminal = %id, count = self.terminals.len(), "registered");
        id
    }

    /// Forget a terminal. Returns `false` if it was not registered.
    ///
    /// When the front terminal goes, the one after it takes its place
    /// (without focus events).
    pub fn unregister(&mut self, id: TerminalId) -> bool {
        let Some(index) = self.terminals.iter().position(|&t| t == id) else {
            return false;
        };
        self.terminals.remove(index);
        if index < self.front {
            self.front -= 1;
        }
        if self.front >= self.terminals.len() {
            self.front = 0;
        }
        if let Some((_, Deferred::Toggle(target, _))) = self.pending
            && target == id
        {
            self.pending = None;
        }
        debug!(terminal = %id, count = self.terminals.len(), "unregistered");
        true
    }

    /// Number of registered terminals.
    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    /// Whether no terminal is registered.
    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    /// Registered terminals in creation order.
    pub fn terminals(&self) -> &[TerminalId] {
        &self.terminals
    }

    /// Terminal currently at the front.
    pub fn focused(&self) -> Option<TerminalId> {
        self.terminals.get(self.front).copied()
    }

    /// Advance the front to the next terminal (wrapping).
    pub fn rotate(&mut self) -> Option<TerminalId> {
        if self.terminals.is_empty() {
            return None;
        }
        self.front = (self.front + 1) % self.terminals.len();
        self.focused()
    }

    /// Give `id` the focus.
    ///
    /// With several terminals the previous front is disabled and `id`
    /// enabled at once. With a single terminal the change is deferred.
    pub fn focus(&mut self, id: TerminalId, now: Instant) -> FocusEvents {
        self.request(id, true, now)
    }

    /// Take the focus away from `id`.
    ///
    /// With several terminals `id` is disabled at once and the next terminal
    /// gains focus after the delay. With a single terminal the change is
    /// deferred.
    pub fn blur(&mut self, id: TerminalId, now: Instant) -> FocusEvents {
        self.request(id, false, now)
    }

    fn request(&mut self, id: TerminalId, enable: bool, now: Instant) -> FocusEvents {
        let mut events = FocusEvents::new();
        let Some(index) = self.terminals.iter().position(|&t| t == id) else {
            return events;
        };

        if self.terminals.len() == 1 {
            self.defer(now, Deferred::Toggle(id, enable));
            return events;
        }

        if enable {
            return self.take_front(index);
        }
        let _ = events.push(FocusEvent::Disable(id));
        self.defer(now, Deferred::Rotate);
        events
    }

    /// Give a newly created terminal the focus without any delay.
    ///
    /// The previous front terminal (if another one) is disabled.
    pub fn activate(&mut self, id: TerminalId) -> FocusEvents {
        match self.terminals.iter().position(|&t| t == id) {
            Some(index) => self.take_front(index),
            None => FocusEvents::new(),
        }
    }

    fn take_front(&mut self, index: usize) -> FocusEvents {
        let mut events = FocusEvents::new();
        self.pending = None;
        if index != self.front {
            let _ = events.push(FocusEvent::Disable(self.terminals[self.front]));
            self.front = index;
        }
        let _ = events.push(FocusEvent::Enable(self.terminals[index]));
        debug!(terminal = %self.terminals[index], "focus taken");
        events
    }

    fn defer(&mut self, now: Instant, action: Deferred) {
        self.pending = Some((now + self.delay, action));
    }

    /// Whether a deferred change is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the deferred change once its delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<FocusEvent> {
        let (due, action) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        match action {
            Deferred::Toggle(id, true) => Some(FocusEvent::Enable(id)),
            Deferred::Toggle(id, false) => Some(FocusEvent::Disable(id)),
            Deferred::Rotate => self.rotate().map(FocusEvent::Enable),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
