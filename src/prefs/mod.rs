pub mod file;

use std::collections::HashMap;

pub use file::{FilePrefs, PrefsError};

/// Key/value preferences seam. Implementations answer `has`/`get`/`set`/
/// `delete` synchronously on the calling thread; the durable ones are scoped
/// per installation and survive process restarts.
pub trait PrefsStore {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn delete(&mut self, key: &str);
}

/// In-memory store. Nothing survives the process; used for tests and
/// ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    entries: HashMap<String, String>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PrefsStore for MemoryPrefs {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
