use std::any::Any;
use std::fmt::{self, Debug};
use std::rc::Rc;

use arbor_core::{AgentData, ExecutionStatus};

use crate::composite::ChildList;
use crate::node::TaskNode;
use crate::signal::SuccessSignal;

/// Shared handle to a task. One instance serves every agent running the tree.
pub type TaskRef<A> = Rc<dyn Task<A>>;

/// Payload handed from `score` to the `activate` call that follows it in the
/// same tick, so an activation can reuse what scoring computed.
#[derive(Default)]
pub struct DecisionData {
    payload: Option<Box<dyn Any>>,
}

impl DecisionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: 'static>(&mut self, value: T) {
        self.payload = Some(Box::new(value));
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    /// Takes the payload out if it is a `T`; a payload of another type is kept.
    pub fn take<T: 'static>(&mut self) -> Option<T> {
        if !self.payload.as_ref()?.is::<T>() {
            return None;
        }
        let payload = self.payload.take()?;
        payload.downcast::<T>().ok().map(|b| *b)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn clear(&mut self) {
        self.payload = None;
    }
}

impl Debug for DecisionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionData")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// A decision unit with a four-phase lifecycle.
///
/// An *episode* runs from a successful `activate` until `update` (or `activate`
/// itself) returns `Success`/`Failure`, or until a parent forces it to stop with
/// `deactivate`.
///
/// - `score` rates eligibility: `<= 0` means ineligible, positive values are
///   ranked by the parent. It may be called without a following `activate` and
///   must not change anything another task could observe.
/// - `activate` is called at most once per episode, right after a positive
///   `score` of the same task in the same tick.
/// - `update` is called every tick while the episode is `Running`.
/// - `deactivate` is called when the episode ends by any means and must be a
///   no-op for an agent that was never activated.
///
/// The same instance is shared by all agents, so methods take `&self` and any
/// per-agent memory is keyed by [`AgentData::id`].
pub trait Task<A: AgentData>: 'static {
    /// Short name for logs and introspection.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    fn score(&self, agent: &A, decision: &mut DecisionData) -> f32;

    fn activate(&self, agent: &mut A, decision: DecisionData) -> ExecutionStatus;

    fn update(&self, agent: &mut A) -> ExecutionStatus;

    fn deactivate(&self, agent: &mut A);

    /// Fired by whoever drives this task when one of its episodes succeeds.
    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        None
    }

    /// Ordered children, for composites.
    fn children(&self) -> Option<&ChildList<A>> {
        None
    }

    /// Appends a node for every descendant currently active for `agent`.
    ///
    /// `node` addresses this task. Read-only: safe to call in any state.
    fn append_active_tasks(
        &self,
        _agent: &A,
        _node: &Rc<TaskNode<A>>,
        _out: &mut Vec<Rc<TaskNode<A>>>,
    ) {
    }
}

/// Whether two handles point at the same task instance.
pub fn same_task<A: AgentData>(a: &TaskRef<A>, b: &TaskRef<A>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Runs `f` one decider level deeper, restoring the level afterwards.
pub fn descend<A: AgentData, R>(agent: &mut A, f: impl FnOnce(&mut A) -> R) -> R {
    let level = agent.decider_level();
    agent.set_decider_level(level + 1);
    let result = f(agent);
    agent.set_decider_level(level);
    result
}

/// Ends a task's episode after it reported `status`.
///
/// Terminal statuses deactivate the task; `Success` then fires its success
/// signal. `Running` and `Idle` do nothing.
pub fn conclude<A, T>(task: &T, agent: &mut A, status: ExecutionStatus)
where
    A: AgentData,
    T: Task<A> + ?Sized,
{
    if !status.is_terminal() {
        return;
    }
    task.deactivate(agent);
    if status == ExecutionStatus::Success {
        if let Some(signal) = task.success_signal() {
            signal.emit(agent);
        }
    }
}
