//! Animation name to index cache
//!
//! Bottango addresses animations by their position in the list returned by
//! `GET Animations/`. The index is only valid until the list changes on the
//! server, so callers rebuild it before relying on it.

use std::collections::HashMap;

/// Positional name -> index map built from the server's animation list
#[derive(Debug, Clone, Default)]
pub struct AnimationIndex {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl AnimationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache contents with `names`, the i-th name mapping to i.
    ///
    /// Previous entries are dropped. If a name appears twice the later
    /// position wins.
    pub fn rebuild(&mut self, names: &[String]) {
        self.by_name.clear();
        for (index, name) in names.iter().enumerate() {
            self.by_name.insert(name.clone(), index);
        }
        self.names = names.to_vec();
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Names in server order, as of the last rebuild
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
