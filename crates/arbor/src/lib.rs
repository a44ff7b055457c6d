//! Umbrella crate that re-exports the `arbor-*` building blocks.
//!
//! ```
//! use std::rc::Rc;
//!
//! use arbor::prelude::*;
//!
//! struct Idle;
//!
//! impl Task<Agent<u32>> for Idle {
//!     fn score(&self, _agent: &Agent<u32>, _decision: &mut DecisionData) -> f32 {
//!         0.1
//!     }
//!     fn activate(&self, _agent: &mut Agent<u32>, _decision: DecisionData) -> ExecutionStatus {
//!         ExecutionStatus::Running
//!     }
//!     fn update(&self, _agent: &mut Agent<u32>) -> ExecutionStatus {
//!         ExecutionStatus::Running
//!     }
//!     fn deactivate(&self, _agent: &mut Agent<u32>) {}
//! }
//!
//! let root = PrioritySelector::with_children(1, [Rc::new(Idle) as TaskRef<Agent<u32>>]).unwrap();
//! let tree = BehaviorTree::new(Rc::new(root) as TaskRef<Agent<u32>>);
//! let mut agent = Agent::new(7u32);
//! tree.update(&mut agent);
//! assert_eq!(agent.status(), ExecutionStatus::Running);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use arbor_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use arbor_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use arbor_bt as bt;

/// The names most hosts need to build and drive a tree.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use arbor_core::{Agent, AgentData, AgentId, AgentTable, BbKey, Blackboard, ExecutionStatus};

    #[cfg(feature = "bt")]
    pub use arbor_bt::{
        BehaviorTree, Composite, DecisionData, DynamicTask, EventBinding, EventTask, Inverter,
        PrioritySelector, Sequence, Task, TaskRef,
    };
}
