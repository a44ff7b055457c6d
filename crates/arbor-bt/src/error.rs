use thiserror::Error;

/// Invalid structural edit of a composite's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("composite is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("child index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A tree position that the packed [`TreeId`](crate::TreeId) cannot address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreePathError {
    #[error("sibling index {index} exceeds the 15 children addressable per level")]
    FanOutExceeded { index: usize },

    #[error("depth {depth} exceeds the 16 levels addressable by a tree id")]
    DepthExceeded { depth: usize },
}
