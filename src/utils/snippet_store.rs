// This file contains the in-memory snippet collection shared by all requests.
#![forbid(unsafe_code)]

use std::sync::Arc;
use parking_lot::RwLock;

// ---------------------------------------------------------------------------
// Snippet:
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub code: String,
}

impl Snippet {
    pub fn new(title: String, code: String) -> Self {
        Self {title, code}
    }
}

// ---------------------------------------------------------------------------
// SnippetStore:
// ---------------------------------------------------------------------------
/** The ordered, append-only snippet collection.  The collection is empty
 * when the store is created and lives as long as the last handle to it.
 * 
 * Cloning a store produces another handle to the same collection, which is
 * how the store is shared between the server's endpoints.  Appends take the
 * write lock, so concurrent appends never interleave, but their relative
 * order is the order in which they acquire the lock.
 */
#[derive(Debug, Clone, Default)]
pub struct SnippetStore {
    snippets: Arc<RwLock<Vec<Snippet>>>,
}

impl SnippetStore {
    pub fn new() -> Self {
        SnippetStore::default()
    }

    /// Return a copy of the collection in insertion order.
    pub fn list(&self) -> Vec<Snippet> {
        self.snippets.read().clone()
    }

    /// Add a snippet to the end of the collection and return the new size.
    pub fn append(&self, snippet: Snippet) -> usize {
        let mut snippets = self.snippets.write();
        snippets.push(snippet);
        snippets.len()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.snippets.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.snippets.read().is_empty()
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{Snippet, SnippetStore};
    use std::thread;

    fn snippet(title: &str, code: &str) -> Snippet {
        Snippet::new(title.to_string(), code.to_string())
    }

    #[test]
    fn new_store_is_empty() {
        let store = SnippetStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.list().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let store = SnippetStore::new();
        store.append(snippet("one", "1"));
        store.append(snippet("two", "2"));
        let size = store.append(snippet("three", "3"));

        assert_eq!(size, 3);
        let titles: Vec<String> = store.list().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let store = SnippetStore::new();
        store.append(snippet("hello", "print(1)"));
        store.append(snippet("hello", "print(1)"));

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], list[1]);
    }

    #[test]
    fn clones_share_the_collection() {
        let store = SnippetStore::new();
        let other = store.clone();
        other.append(snippet("shared", "x = 1"));

        assert_eq!(store.list(), vec![snippet("shared", "x = 1")]);
    }

    #[test]
    fn list_is_a_snapshot() {
        let store = SnippetStore::new();
        store.append(snippet("a", "a"));
        let before = store.list();
        store.append(snippet("b", "b"));

        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let store = SnippetStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        store.append(snippet(&format!("t{}", t), &i.to_string()));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let list = store.list();
        assert_eq!(list.len(), 800);

        // Each writer's own appends keep their relative order.
        for t in 0..8 {
            let title = format!("t{}", t);
            let codes: Vec<String> = list.iter()
                .filter(|s| s.title == title)
                .map(|s| s.code.clone())
                .collect();
            let expected: Vec<String> = (0..100).map(|i: i32| i.to_string()).collect();
            assert_eq!(codes, expected);
        }
    }
}
