use thiserror::Error;

/// Misconfiguration of an [`AttributeStore`](crate::AttributeStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute `{key}` already exists")]
    DuplicateKey { key: String },

    #[error("parent store would make the attribute hierarchy cyclic")]
    ParentCycle,

    #[error("parent index {index} out of range (len {len})")]
    ParentIndexOutOfRange { index: usize, len: usize },
}
