//! Agent contract and hierarchical working memory for the arbor behavior tree engine.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod attributes;
pub mod blackboard;
pub mod error;
pub mod status;
pub mod table;

pub use agent::{Agent, AgentData, AgentId};
pub use attributes::{AttrId, AttributeStore, Key, StoreRef};
pub use blackboard::{BbKey, Blackboard, SharedBlackboard};
pub use error::AttributeError;
pub use status::ExecutionStatus;
pub use table::AgentTable;
