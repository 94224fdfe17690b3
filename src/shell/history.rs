//! Command history with bidirectional cyclic navigation.
//!
//! Entries live in a bounded ring (oldest evicted first) and can be persisted
//! to a [`Store`] under a per-scope key. The sequence is never empty: a fresh
//! or cleared history holds a single empty entry, which the first real
//! command replaces.

use crate::store::Store;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Suffix appended to a history scope to form its storage key.
const KEY_SUFFIX: &str = "commands";

/// On-store representation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    commands: Vec<String>,
}

/// Command history storage.
///
/// `position` is `None` while "ready to cycle from the end": the next
/// `previous()` returns the newest entry and the next `next()` the oldest.
#[derive(Debug)]
pub struct History<const N: usize> {
    entries: heapless::Vec<String, N>,
    position: Option<usize>,
    enabled: bool,
    scope: String,
    persist: bool,
}

impl<const N: usize> History<N> {
    /// Create an unbound, non-persisting history.
    pub fn new() -> Self {
        let mut entries = heapless::Vec::new();
        let _ = entries.push(String::new());
        Self {
            entries,
            position: None,
            enabled: true,
            scope: String::new(),
            persist: false,
        }
    }

    /// Rebind to `scope`, loading whatever the store holds for it.
    ///
    /// Unreadable data is logged and ignored. Keeps the enabled flag.
    pub fn bind(&mut self, scope: &str, store: &dyn Store, persist: bool) {
        self.scope = scope.to_owned();
        self.persist = persist;
        self.position = None;
        self.entries.clear();

        if persist {
            if let Some(raw) = store.get(&self.key()) {
                match toml::from_str::<Persisted>(&raw) {
                    Ok(persisted) => {
                        // Keep the newest N if the stored list is longer
                        let skip = persisted.commands.len().saturating_sub(N);
                        for command in persisted.commands.into_iter().skip(skip) {
                            let _ = self.entries.push(command);
                        }
                    }
                    Err(e) => warn!(key = %self.key(), error = %e, "ignoring unreadable history"),
                }
            }
        }

        if self.entries.is_empty() {
            let _ = self.entries.push(String::new());
        }
    }

    /// Storage key of the bound scope.
    pub fn key(&self) -> String {
        if self.scope.is_empty() {
            KEY_SUFFIX.to_owned()
        } else {
            format!("{}_{}", self.scope, KEY_SUFFIX)
        }
    }

    /// Bound scope.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Add command to history.
    ///
    /// Ignored while disabled, for empty commands, and when `command` equals
    /// the current entry.
    pub fn append(&mut self, command: &str, store: &mut dyn Store) {
        if !self.enabled || command.is_empty() || self.current() == command {
            return;
        }

        // First real command replaces the placeholder
        if self.entries.len() == 1 && self.entries[0].is_empty() {
            self.entries.clear();
        }

        // Ring buffer behavior - remove oldest if full
        if self.entries.is_full() {
            self.entries.remove(0);
        }
        let _ = self.entries.push(command.to_owned());
        self.position = None;

        self.save(store);
    }

    /// Step back (towards older entries), wrapping from the oldest to the
    /// newest.
    pub fn previous(&mut self) -> &str {
        let last = self.entries.len() - 1;
        let pos = match self.position {
            None | Some(0) => last,
            Some(p) => p - 1,
        };
        self.position = Some(pos);
        &self.entries[pos]
    }

    /// Step forward (towards newer entries), wrapping from the newest to the
    /// oldest.
    pub fn next(&mut self) -> &str {
        let last = self.entries.len() - 1;
        let pos = match self.position {
            None => 0,
            Some(p) if p >= last => 0,
            Some(p) => p + 1,
        };
        self.position = Some(pos);
        &self.entries[pos]
    }

    /// Entry the cursor points at (the newest while not navigating).
    pub fn current(&self) -> &str {
        let index = self.position.unwrap_or(self.entries.len() - 1);
        &self.entries[index]
    }

    /// Reset to the single empty entry and drop persisted state.
    pub fn clear(&mut self, store: &mut dyn Store) {
        self.entries.clear();
        let _ = self.entries.push(String::new());
        self.position = None;
        if self.persist {
            store.remove(&self.key());
        }
    }

    /// Accept appends again.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Ignore appends (used while credentials are typed).
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether appends are accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries (at least 1).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether only the empty placeholder is held.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].is_empty()
    }

    fn save(&self, store: &mut dyn Store) {
        if !self.persist {
            return;
        }
        let persisted = Persisted {
            commands: self.entries.iter().cloned().collect(),
        };
        match toml::to_string(&persisted) {
            Ok(raw) => store.set(&self.key(), &raw),
            Err(e) => warn!(key = %self.key(), error = %e, "failed to serialize history"),
        }
    }
}

impl<const N: usize> Default for History<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn history_with(commands: &[&str]) -> (History<5>, MemoryStore) {
        let mut store = MemoryStore::new();
        let mut history = History::<5>::new();
        history.bind("main_0", &store, true);
        for command in commands {
            history.append(command, &mut store);
        }
        (history, store)
    }

    #[test]
    fn test_fresh_history_holds_placeholder() {
        let mut history = History::<5>::new();
        assert_eq!(history.len(), 1);
        assert!(history.is_empty());
        assert_eq!(history.previous(), "");
        assert_eq!(history.next(), "");
    }

    #[test]
    fn test_previous_cycles_in_reverse_and_wraps() {
        let (mut history, _) = history_with(&["cmd1", "cmd2", "cmd3"]);

        assert_eq!(history.previous(), "cmd3");
        assert_eq!(history.previous(), "cmd2");
        assert_eq!(history.previous(), "cmd1");
        // Wraps to the newest
        assert_eq!(history.previous(), "cmd3");
    }

    #[test]
    fn test_next_undoes_previous() {
        let (mut history, _) = history_with(&["cmd1", "cmd2", "cmd3"]);

        history.previous();
        history.previous();
        assert_eq!(history.current(), "cmd2");
        assert_eq!(history.next(), "cmd3");
        assert_eq!(history.previous(), "cmd2");
        // Wraps from newest to oldest
        history.next();
        assert_eq!(history.next(), "cmd1");
    }

    #[test]
    fn test_duplicate_commands_ignored() {
        let (mut history, mut store) = history_with(&["cmd1"]);
        history.append("cmd1", &mut store);
        assert_eq!(history.len(), 1);

        history.append("cmd2", &mut store);
        history.append("cmd1", &mut store);
        assert_eq!(history.entries(), ["cmd1", "cmd2", "cmd1"]);
    }

    #[test]
    fn test_empty_commands_ignored() {
        let (history, _) = history_with(&["", "cmd1", ""]);
        assert_eq!(history.entries(), ["cmd1"]);
    }

    #[test]
    fn test_ring_buffer_behavior() {
        let (history, _) = history_with(&["c1", "c2", "c3", "c4", "c5", "c6"]);
        assert_eq!(history.entries(), ["c2", "c3", "c4", "c5", "c6"]);
    }

    #[test]
    fn test_disabled_history_ignores_appends() {
        let (mut history, mut store) = history_with(&["cmd1"]);
        history.disable();
        history.append("secret", &mut store);
        assert_eq!(history.entries(), ["cmd1"]);
        history.enable();
        history.append("cmd2", &mut store);
        assert_eq!(history.entries(), ["cmd1", "cmd2"]);
    }

    #[test]
    fn test_persists_and_reloads() {
        let (_, store) = history_with(&["ls", "cd /tmp"]);
        assert!(store.contains("main_0_commands"));

        let mut reloaded = History::<5>::new();
        reloaded.bind("main_0", &store, true);
        assert_eq!(reloaded.entries(), ["ls", "cd /tmp"]);

        // Other scopes are independent
        let mut other = History::<5>::new();
        other.bind("nested_0", &store, true);
        assert!(other.is_empty());
    }

    #[test]
    fn test_clear_removes_persisted_state() {
        let (mut history, mut store) = history_with(&["ls"]);
        history.clear(&mut store);
        assert!(history.is_empty());
        assert!(!store.contains("main_0_commands"));
    }

    #[test]
    fn test_unreadable_store_data_ignored() {
        let mut store = MemoryStore::new();
        store.set("main_0_commands", "not = [valid");
        let mut history = History::<5>::new();
        history.bind("main_0", &store, true);
        assert!(history.is_empty());
    }

    #[test]
    fn test_no_persistence_when_disabled() {
        let mut store = MemoryStore::new();
        let mut history = History::<5>::new();
        history.bind("main_0", &store, false);
        history.append("ls", &mut store);
        assert!(store.is_empty());
        assert_eq!(history.entries(), ["ls"]);
    }
}
