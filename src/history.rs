//! Browser-history synchronization boundary.

use std::cell::RefCell;

/// A location as stored in history: the visible URL split into parts.
/// `search` includes the leading `?` and `hash` the leading `#` when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLocation {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl HistoryLocation {
    pub fn url(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

/// One history entry. `router_ignore` marks entries written by the router
/// itself; popping back to them must not re-trigger navigation handling in
/// other listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub location: HistoryLocation,
    pub router_ignore: bool,
}

/// History persistence. The navigation controller pushes or replaces one
/// entry per completed render.
pub trait History {
    fn push(&self, entry: HistoryEntry);
    fn replace(&self, entry: HistoryEntry);
    fn current(&self) -> Option<HistoryEntry>;
}

/// Vec-backed history used by tests and demos.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: RefCell<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Pops the current entry and returns the one before it, as a popstate
    /// would surface it.
    pub fn back(&self) -> Option<HistoryEntry> {
        let mut entries = self.entries.borrow_mut();
        entries.pop();
        entries.last().cloned()
    }
}

impl<H: History + ?Sized> History for std::rc::Rc<H> {
    fn push(&self, entry: HistoryEntry) {
        (**self).push(entry)
    }

    fn replace(&self, entry: HistoryEntry) {
        (**self).replace(entry)
    }

    fn current(&self) -> Option<HistoryEntry> {
        (**self).current()
    }
}

impl History for MemoryHistory {
    fn push(&self, entry: HistoryEntry) {
        self.entries.borrow_mut().push(entry);
    }

    fn replace(&self, entry: HistoryEntry) {
        let mut entries = self.entries.borrow_mut();
        entries.pop();
        entries.push(entry);
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.entries.borrow().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> HistoryEntry {
        HistoryEntry {
            location: HistoryLocation {
                pathname: path.to_string(),
                ..HistoryLocation::default()
            },
            router_ignore: true,
        }
    }

    #[test]
    fn push_and_replace() {
        let h = MemoryHistory::new();
        h.push(entry("/a"));
        h.push(entry("/b"));
        assert_eq!(h.len(), 2);
        h.replace(entry("/c"));
        assert_eq!(h.len(), 2);
        assert_eq!(h.current().unwrap().location.pathname, "/c");
    }

    #[test]
    fn url_concatenation() {
        let loc = HistoryLocation {
            pathname: "/a".to_string(),
            search: "?q=1".to_string(),
            hash: "#top".to_string(),
        };
        assert_eq!(loc.url(), "/a?q=1#top");
    }
}
