use std::fmt::{self, Debug};

use arbor_core::AgentData;

use crate::error::StructureError;
use crate::task::{same_task, Task, TaskRef};

type ChildListener<A> = Box<dyn Fn(usize, &TaskRef<A>)>;

/// Ordered, capacity-bounded children of a composite.
///
/// Order is meaningful: it defines tree addresses and the default tie-break.
/// Listeners run synchronously after each `add`/`insert`/`remove` with the
/// affected index and child.
pub struct ChildList<A: AgentData> {
    capacity: usize,
    children: Vec<TaskRef<A>>,
    added: Vec<ChildListener<A>>,
    removed: Vec<ChildListener<A>>,
}

impl<A: AgentData> ChildList<A> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            children: Vec::with_capacity(capacity.min(16)),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.children.len() >= self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&TaskRef<A>> {
        self.children.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskRef<A>> {
        self.children.iter()
    }

    pub fn as_slice(&self) -> &[TaskRef<A>] {
        &self.children
    }

    /// Index of the first occurrence of `child`.
    pub fn position(&self, child: &TaskRef<A>) -> Option<usize> {
        self.children.iter().position(|c| same_task(c, child))
    }

    pub fn contains(&self, child: &TaskRef<A>) -> bool {
        self.position(child).is_some()
    }

    /// Appends `child`, returning its index.
    pub fn add(&mut self, child: TaskRef<A>) -> Result<usize, StructureError> {
        let index = self.children.len();
        self.insert(index, child)?;
        Ok(index)
    }

    /// Inserts `child` at `index` (`0..=len`).
    pub fn insert(&mut self, index: usize, child: TaskRef<A>) -> Result<(), StructureError> {
        if index > self.children.len() {
            return Err(StructureError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        if self.is_full() {
            return Err(StructureError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.children.insert(index, child);
        for listener in &self.added {
            listener(index, &self.children[index]);
        }
        Ok(())
    }

    /// Moves the child at `old` to `new`; both must be in `0..len`.
    pub fn move_child(&mut self, old: usize, new: usize) -> Result<(), StructureError> {
        let len = self.children.len();
        for index in [old, new] {
            if index >= len {
                return Err(StructureError::IndexOutOfRange { index, len });
            }
        }
        let child = self.children.remove(old);
        self.children.insert(new, child);
        Ok(())
    }

    /// Removes the first occurrence of `child`. Absence is not an error.
    pub fn remove(&mut self, child: &TaskRef<A>) -> bool {
        let Some(index) = self.position(child) else {
            return false;
        };
        let child = self.children.remove(index);
        for listener in &self.removed {
            listener(index, &child);
        }
        true
    }

    pub fn on_child_added(&mut self, listener: impl Fn(usize, &TaskRef<A>) + 'static) {
        self.added.push(Box::new(listener));
    }

    pub fn on_child_removed(&mut self, listener: impl Fn(usize, &TaskRef<A>) + 'static) {
        self.removed.push(Box::new(listener));
    }
}

impl<A: AgentData> Debug for ChildList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildList")
            .field("capacity", &self.capacity)
            .field(
                "children",
                &self.children.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<'a, A: AgentData> IntoIterator for &'a ChildList<A> {
    type Item = &'a TaskRef<A>;
    type IntoIter = std::slice::Iter<'a, TaskRef<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// A task that owns an ordered set of children.
///
/// Structural edits take `&mut self`: build the composite, then share it. The
/// same child may appear under several composites, but trees are expected to
/// be tree-shaped.
pub trait Composite<A: AgentData>: Task<A> {
    fn child_list(&self) -> &ChildList<A>;

    fn child_list_mut(&mut self) -> &mut ChildList<A>;

    fn capacity(&self) -> usize {
        self.child_list().capacity()
    }

    fn child_count(&self) -> usize {
        self.child_list().len()
    }

    fn add_child(&mut self, child: TaskRef<A>) -> Result<usize, StructureError> {
        self.child_list_mut().add(child)
    }

    fn insert_child(&mut self, index: usize, child: TaskRef<A>) -> Result<(), StructureError> {
        self.child_list_mut().insert(index, child)
    }

    fn move_child(&mut self, old: usize, new: usize) -> Result<(), StructureError> {
        self.child_list_mut().move_child(old, new)
    }

    fn remove_child(&mut self, child: &TaskRef<A>) -> bool {
        self.child_list_mut().remove(child)
    }
}
