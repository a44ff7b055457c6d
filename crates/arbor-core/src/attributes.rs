//! Key/value tables with ordered parent fallback.
//!
//! A lookup tries the store itself, then each parent in list order, recursing
//! depth-first into the parent's own parents. The first hit wins, so a local
//! value shadows every ancestor. Parents are shared handles: one team-scope
//! store can sit behind many agent stores.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::AttributeError;

/// Identifier type usable as an attribute key.
pub trait AttrId: Copy + Ord + Debug + 'static {}

impl<K> AttrId for K where K: Copy + Ord + Debug + 'static {}

/// Typed key: an id plus the type of the value stored under it.
pub struct Key<K, T: 'static> {
    id: K,
    _phantom: PhantomData<fn() -> T>,
}

impl<K: Copy, T: 'static> Copy for Key<K, T> {}

impl<K: Copy, T: 'static> Clone for Key<K, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: PartialEq, T: 'static> PartialEq for Key<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: Eq, T: 'static> Eq for Key<K, T> {}

impl<K: Debug, T: 'static> Debug for Key<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.id).finish()
    }
}

impl<K: AttrId, T: 'static> Key<K, T> {
    pub const fn new(id: K) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> K {
        self.id
    }
}

/// Shared, mutable handle to a store used as a parent.
pub type StoreRef<K> = Rc<RefCell<AttributeStore<K>>>;

pub struct AttributeStore<K: AttrId> {
    values: BTreeMap<K, Box<dyn Any>>,
    parents: Vec<StoreRef<K>>,
}

impl<K: AttrId> Default for AttributeStore<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            parents: Vec::new(),
        }
    }
}

impl<K: AttrId> AttributeStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose lookups fall back to `parent`.
    pub fn child_of(parent: &StoreRef<K>) -> Self {
        Self {
            values: BTreeMap::new(),
            parents: vec![Rc::clone(parent)],
        }
    }

    pub fn into_shared(self) -> StoreRef<K> {
        Rc::new(RefCell::new(self))
    }

    /// Number of local entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.values.keys().copied()
    }

    /// Drops every local entry. Parents are kept.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Insert or overwrite a local entry.
    pub fn set<T: 'static>(&mut self, key: Key<K, T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    /// Declare a new local entry; fails if the key is already present locally.
    pub fn add<T: 'static>(&mut self, key: Key<K, T>, value: T) -> Result<(), AttributeError> {
        if self.values.contains_key(&key.id) {
            return Err(AttributeError::DuplicateKey {
                key: format!("{:?}", key.id),
            });
        }
        self.values.insert(key.id, Box::new(value));
        Ok(())
    }

    /// Removes a local entry of any type. Returns whether something was removed.
    pub fn remove(&mut self, id: K) -> bool {
        self.values.remove(&id).is_some()
    }

    /// Removes and returns a local entry if it holds a `T`; other types are left in place.
    pub fn take<T: 'static>(&mut self, key: Key<K, T>) -> Option<T> {
        if !self.values.get(&key.id)?.is::<T>() {
            return None;
        }
        let value = self.values.remove(&key.id)?;
        value.downcast::<T>().ok().map(|b| *b)
    }

    pub fn contains_local(&self, id: K) -> bool {
        self.values.contains_key(&id)
    }

    /// Hierarchical, typed presence check.
    pub fn contains<T: 'static>(&self, key: Key<K, T>) -> bool {
        self.with(key, |_| ()).is_some()
    }

    pub fn get_local<T: 'static>(&self, key: Key<K, T>) -> Option<&T> {
        self.values.get(&key.id)?.downcast_ref::<T>()
    }

    pub fn get_local_mut<T: 'static>(&mut self, key: Key<K, T>) -> Option<&mut T> {
        self.values.get_mut(&key.id)?.downcast_mut::<T>()
    }

    /// Hierarchical lookup that clones the first matching value.
    ///
    /// A value stored under the key with a different type counts as a miss and
    /// the search continues with the parents.
    pub fn try_get<T: Clone + 'static>(&self, key: Key<K, T>) -> Option<T> {
        self.with(key, T::clone)
    }

    /// Hierarchical lookup that borrows the first matching value for `f`.
    ///
    /// # Panics
    ///
    /// Panics if a parent on the search path is mutably borrowed.
    pub fn with<T: 'static, R>(&self, key: Key<K, T>, f: impl FnOnce(&T) -> R) -> Option<R> {
        let mut f = Some(f);
        self.visit(key, &mut f)
    }

    fn visit<T: 'static, R, F>(&self, key: Key<K, T>, f: &mut Option<F>) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        if let Some(value) = self.get_local(key) {
            return f.take().map(|f| f(value));
        }
        for parent in &self.parents {
            if let Some(found) = parent.borrow().visit(key, f) {
                return Some(found);
            }
        }
        None
    }

    pub fn parents(&self) -> &[StoreRef<K>] {
        &self.parents
    }

    pub fn add_parent(&mut self, parent: StoreRef<K>) -> Result<(), AttributeError> {
        self.insert_parent(self.parents.len(), parent)
    }

    /// Insert a parent at `index` (`0..=len`).
    ///
    /// Rejects a parent whose ancestry reaches this store.
    pub fn insert_parent(&mut self, index: usize, parent: StoreRef<K>) -> Result<(), AttributeError> {
        if index > self.parents.len() {
            return Err(AttributeError::ParentIndexOutOfRange {
                index,
                len: self.parents.len(),
            });
        }
        if self.reachable_from(&parent) {
            return Err(AttributeError::ParentCycle);
        }
        self.parents.insert(index, parent);
        Ok(())
    }

    /// Removes the first occurrence of `parent`. Returns whether it was present.
    pub fn remove_parent(&mut self, parent: &StoreRef<K>) -> bool {
        match self.parents.iter().position(|p| Rc::ptr_eq(p, parent)) {
            Some(index) => {
                self.parents.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `parent` is a direct parent.
    pub fn has_parent(&self, parent: &StoreRef<K>) -> bool {
        self.parents.iter().any(|p| Rc::ptr_eq(p, parent))
    }

    pub fn clear_parents(&mut self) {
        self.parents.clear();
    }

    // The identity check runs before borrowing: a shared store being modified
    // is itself mutably borrowed. Any other ancestor held mutably elsewhere
    // cannot be walked and is skipped.
    fn reachable_from(&self, handle: &StoreRef<K>) -> bool {
        if std::ptr::eq(handle.as_ptr() as *const Self, self) {
            return true;
        }
        match handle.try_borrow() {
            Ok(store) => store.parents.iter().any(|p| self.reachable_from(p)),
            Err(_) => false,
        }
    }
}

impl<K: AttrId> Debug for AttributeStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .field("parents", &self.parents.len())
            .finish()
    }
}
