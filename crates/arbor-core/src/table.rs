use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

/// Per-agent side table owned by a shared task.
///
/// One task instance serves every agent running its tree, so anything it
/// remembers between calls lives here, keyed by agent id. Calls take `&self`.
pub struct AgentTable<Id, V> {
    entries: RefCell<BTreeMap<Id, V>>,
}

impl<Id: Ord, V> Default for AgentTable<Id, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
        }
    }
}

impl<Id: Ord + Copy, V> AgentTable<Id, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: Id, value: V) -> Option<V> {
        self.entries.borrow_mut().insert(id, value)
    }

    pub fn remove(&self, id: Id) -> Option<V> {
        self.entries.borrow_mut().remove(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub fn with<R>(&self, id: Id, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.entries.borrow().get(&id).map(f)
    }

    pub fn with_mut<R>(&self, id: Id, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.entries.borrow_mut().get_mut(&id).map(f)
    }

    pub fn ids(&self) -> Vec<Id> {
        self.entries.borrow().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Empties the table, returning every entry in id order.
    pub fn drain(&self) -> Vec<(Id, V)> {
        std::mem::take(&mut *self.entries.borrow_mut())
            .into_iter()
            .collect()
    }
}

impl<Id: Ord + Copy, V: Clone> AgentTable<Id, V> {
    pub fn get(&self, id: Id) -> Option<V> {
        self.with(id, V::clone)
    }
}

impl<Id: Debug, V: Debug> Debug for AgentTable<Id, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entries.try_borrow() {
            Ok(entries) => f.debug_map().entries(entries.iter()).finish(),
            Err(_) => f.write_str("AgentTable { <borrowed> }"),
        }
    }
}
