//! Addressing tasks inside one tree walk.
//!
//! A [`TreeId`] packs a root-to-node path into a `u64`, four bits per level.
//! Each level stores `sibling index + 1`, so `0` never appears inside a path
//! and the id `0` means "no node". Four bits per level cap the tree at 15
//! children per composite and 16 levels (root included). Trees that need more
//! should address nodes by [`TaskNode::path`] instead.

use std::fmt::{self, Debug};
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use arbor_core::AgentData;

use crate::error::TreePathError;
use crate::task::TaskRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeId(u64);

impl TreeId {
    pub const NONE: TreeId = TreeId(0);
    pub const ROOT: TreeId = TreeId(1);

    pub const BITS_PER_LEVEL: u32 = 4;
    pub const MAX_FAN_OUT: usize = (1 << Self::BITS_PER_LEVEL) - 1;
    pub const MAX_LEVELS: usize = (u64::BITS / Self::BITS_PER_LEVEL) as usize;

    const LEVEL_MASK: u64 = (1 << Self::BITS_PER_LEVEL) - 1;

    pub fn from_raw(raw: u64) -> Self {
        TreeId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Number of levels encoded; the root alone is one level.
    pub fn levels(self) -> usize {
        let bits = u64::BITS - self.0.leading_zeros();
        bits.div_ceil(Self::BITS_PER_LEVEL) as usize
    }

    /// Id of the `index`-th child of the node addressed by `self`.
    pub fn child(self, index: usize) -> Result<TreeId, TreePathError> {
        if index >= Self::MAX_FAN_OUT {
            return Err(TreePathError::FanOutExceeded { index });
        }
        let levels = self.levels();
        if levels >= Self::MAX_LEVELS {
            return Err(TreePathError::DepthExceeded { depth: levels });
        }
        Ok(TreeId((self.0 << Self::BITS_PER_LEVEL) | (index as u64 + 1)))
    }

    /// Builds an id from sibling indices, root first. The root's own index is
    /// normally `0`.
    pub fn from_indices(indices: &[usize]) -> Result<TreeId, TreePathError> {
        indices
            .iter()
            .try_fold(TreeId::NONE, |id, &index| id.child(index))
    }

    /// Sibling indices, root first. Empty for [`TreeId::NONE`].
    ///
    /// `None` if a level inside the path is zero, which no valid id contains
    /// (e.g. a raw value built by hand or read from outside).
    pub fn indices(self) -> Option<Vec<usize>> {
        let mut indices = Vec::with_capacity(self.levels());
        let mut raw = self.0;
        while raw != 0 {
            let level = ((raw & Self::LEVEL_MASK) as usize).checked_sub(1)?;
            indices.push(level);
            raw >>= Self::BITS_PER_LEVEL;
        }
        indices.reverse();
        Some(indices)
    }

    pub fn parent(self) -> Option<TreeId> {
        if self.levels() <= 1 {
            return None;
        }
        Some(TreeId(self.0 >> Self::BITS_PER_LEVEL))
    }
}

/// One task's position in a single tree walk.
///
/// Created fresh per walk; holds its parent chain so callers can recover the
/// full path of anything a walk returns.
pub struct TaskNode<A: AgentData> {
    task: TaskRef<A>,
    parent: Option<Rc<TaskNode<A>>>,
    depth: usize,
    index: usize,
    id: TreeId,
}

impl<A: AgentData> TaskNode<A> {
    pub fn root(task: TaskRef<A>) -> Rc<Self> {
        Rc::new(Self {
            task,
            parent: None,
            depth: 0,
            index: 0,
            id: TreeId::ROOT,
        })
    }

    /// Node for `task` as the `index`-th child of `self`.
    pub fn child(self: &Rc<Self>, index: usize, task: TaskRef<A>) -> Result<Rc<Self>, TreePathError> {
        let id = self.id.child(index)?;
        Ok(Rc::new(Self {
            task,
            parent: Some(Rc::clone(self)),
            depth: self.depth + 1,
            index,
            id,
        }))
    }

    pub fn task(&self) -> &TaskRef<A> {
        &self.task
    }

    pub fn parent(&self) -> Option<&Rc<TaskNode<A>>> {
        self.parent.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index among the parent's children; `0` for the root.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    /// This node followed by each ancestor up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &TaskNode<A>> {
        std::iter::successors(Some(self), |node| node.parent.as_deref())
    }

    /// Sibling indices, root first.
    pub fn path(&self) -> Vec<usize> {
        let mut path: Vec<usize> = self.ancestors().map(|node| node.index).collect();
        path.reverse();
        path
    }
}

impl<A: AgentData> Debug for TaskNode<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("task", &self.task.name())
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("id", &format_args!("{:#x}", self.id.0))
            .finish()
    }
}

/// Pushes a node for `child` (the `index`-th child under `node`) and lets it
/// append its own active descendants.
///
/// Positions a [`TreeId`] cannot address are skipped.
pub fn append_active_child<A: AgentData>(
    agent: &A,
    node: &Rc<TaskNode<A>>,
    index: usize,
    child: &TaskRef<A>,
    out: &mut Vec<Rc<TaskNode<A>>>,
) {
    let Ok(child_node) = node.child(index, Rc::clone(child)) else {
        return;
    };
    out.push(Rc::clone(&child_node));
    child.append_active_tasks(agent, &child_node, out);
}
