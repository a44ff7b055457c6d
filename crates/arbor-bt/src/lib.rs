//! Scored behavior tree runtime built on `arbor-core`.
//!
//! One tree definition drives many agents. Every tick the host calls
//! [`BehaviorTree::update`] once per agent; the driver scores the root, activates
//! it when eligible and keeps updating it while the episode is running. Task
//! instances are shared by all agents, so whatever they remember between calls
//! is keyed by agent id (see [`arbor_core::AgentTable`]).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod composite;
pub mod dynamic;
pub mod error;
pub mod event;
pub mod node;
pub mod nodes;
pub mod signal;
pub mod task;
pub mod tree;

pub use composite::{ChildList, Composite};
pub use dynamic::{Delegate, DynamicTask};
pub use error::{StructureError, TreePathError};
pub use event::{EventBinding, EventSender, EventTask, EVENT_PRIORITY};
pub use node::{append_active_child, TaskNode, TreeId};
pub use nodes::{Inverter, PrioritySelector, SelectorConfig, Sequence};
pub use signal::{SuccessSignal, Subscription};
pub use task::{conclude, descend, same_task, DecisionData, Task, TaskRef};
pub use tree::{BehaviorTree, TreeConfig};
