use core::fmt::{self, Debug};

use crate::{Blackboard, ExecutionStatus};

/// Stable identifier for an agent.
///
/// Tasks are shared by every agent running a tree, so per-agent task state is
/// keyed by this id:
/// - stable ordering (`Ord`) for side tables
/// - a stable numeric ID (`stable_id`) for logs and trace events
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl AgentId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

/// Everything a tree needs from the agent it is driving.
///
/// The host owns the agent data; the tree only reads and writes it during a
/// call. Hooks default to no-ops.
pub trait AgentData: 'static {
    type Id: AgentId;

    fn id(&self) -> Self::Id;

    fn status(&self) -> ExecutionStatus;

    fn set_status(&mut self, status: ExecutionStatus);

    fn blackboard(&self) -> &Blackboard;

    fn blackboard_mut(&mut self) -> &mut Blackboard;

    /// Nesting depth of the composite call currently in progress.
    fn decider_level(&self) -> u32;

    fn set_decider_level(&mut self, level: u32);

    /// Tick counter used to stamp trace events.
    fn tick(&self) -> u64 {
        0
    }

    fn pre_tick(&mut self) {}

    fn post_tick(&mut self) {}
}

type TickHook<Id> = Box<dyn FnMut(Id, &mut Blackboard)>;

/// Ready-made [`AgentData`] for hosts without their own agent type.
///
/// `post_tick` advances the tick counter after running the user hook.
pub struct Agent<Id: AgentId> {
    id: Id,
    status: ExecutionStatus,
    decider_level: u32,
    ticks: u64,
    pub blackboard: Blackboard,
    pre_tick: Option<TickHook<Id>>,
    post_tick: Option<TickHook<Id>>,
}

impl<Id: AgentId> Agent<Id> {
    pub fn new(id: Id) -> Self {
        Self::with_blackboard(id, Blackboard::new())
    }

    pub fn with_blackboard(id: Id, blackboard: Blackboard) -> Self {
        Self {
            id,
            status: ExecutionStatus::Idle,
            decider_level: 0,
            ticks: 0,
            blackboard,
            pre_tick: None,
            post_tick: None,
        }
    }

    pub fn with_pre_tick(mut self, hook: impl FnMut(Id, &mut Blackboard) + 'static) -> Self {
        self.pre_tick = Some(Box::new(hook));
        self
    }

    pub fn with_post_tick(mut self, hook: impl FnMut(Id, &mut Blackboard) + 'static) -> Self {
        self.post_tick = Some(Box::new(hook));
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<Id: AgentId> AgentData for Agent<Id> {
    type Id = Id;

    fn id(&self) -> Id {
        self.id
    }

    fn status(&self) -> ExecutionStatus {
        self.status
    }

    fn set_status(&mut self, status: ExecutionStatus) {
        self.status = status;
    }

    fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    fn decider_level(&self) -> u32 {
        self.decider_level
    }

    fn set_decider_level(&mut self, level: u32) {
        self.decider_level = level;
    }

    fn tick(&self) -> u64 {
        self.ticks
    }

    fn pre_tick(&mut self) {
        if let Some(hook) = self.pre_tick.as_mut() {
            hook(self.id, &mut self.blackboard);
        }
    }

    fn post_tick(&mut self) {
        if let Some(hook) = self.post_tick.as_mut() {
            hook(self.id, &mut self.blackboard);
        }
        self.ticks = self.ticks.wrapping_add(1);
    }
}

impl<Id: AgentId> Debug for Agent<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("decider_level", &self.decider_level)
            .field("ticks", &self.ticks)
            .field("blackboard", &self.blackboard)
            .finish_non_exhaustive()
    }
}
