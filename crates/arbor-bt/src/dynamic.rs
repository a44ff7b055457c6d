use std::fmt::{self, Debug};
use std::rc::Rc;

use arbor_core::{AgentData, AgentTable, BbKey, ExecutionStatus};
use tracing::trace;

use crate::node::TaskNode;
use crate::signal::SuccessSignal;
use crate::task::{conclude, DecisionData, Task, TaskRef};

/// Where a [`DynamicTask`] finds the task it forwards to.
pub enum Delegate<A: AgentData> {
    /// Nothing to forward to; the task is never eligible.
    None,
    Task(TaskRef<A>),
    /// Looked up in the agent's blackboard (parents included) on every call.
    Blackboard(BbKey<TaskRef<A>>),
}

impl<A: AgentData> Clone for Delegate<A> {
    fn clone(&self) -> Self {
        match self {
            Delegate::None => Delegate::None,
            Delegate::Task(task) => Delegate::Task(Rc::clone(task)),
            Delegate::Blackboard(key) => Delegate::Blackboard(*key),
        }
    }
}

impl<A: AgentData> Debug for Delegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delegate::None => f.write_str("None"),
            Delegate::Task(task) => f.debug_tuple("Task").field(&task.name()).finish(),
            Delegate::Blackboard(key) => f.debug_tuple("Blackboard").field(&key.id()).finish(),
        }
    }
}

/// Forwards every call to a delegate resolved at call time.
///
/// Resolution is repeated on each of `score`, `activate`, `update` and
/// `deactivate`; nothing is cached, so the delegate may change between a score
/// and the activate that follows it if the blackboard changed in between. An
/// unresolved delegate scores `0`, fails `activate`/`update` and makes
/// `deactivate` a no-op.
///
/// When the delegate finishes an episode it is concluded right away
/// (deactivated, then its success signal fires); the `deactivate` that
/// follows from the parent is then not forwarded a second time.
pub struct DynamicTask<A: AgentData> {
    delegate: Delegate<A>,
    concluded: AgentTable<A::Id, ()>,
    on_success: SuccessSignal<A>,
}

impl<A: AgentData> DynamicTask<A> {
    pub fn new(delegate: Delegate<A>) -> Self {
        Self {
            delegate,
            concluded: AgentTable::new(),
            on_success: SuccessSignal::new(),
        }
    }

    pub fn to_task(task: TaskRef<A>) -> Self {
        Self::new(Delegate::Task(task))
    }

    pub fn from_blackboard(key: BbKey<TaskRef<A>>) -> Self {
        Self::new(Delegate::Blackboard(key))
    }

    pub fn delegate(&self) -> &Delegate<A> {
        &self.delegate
    }

    pub fn set_delegate(&mut self, delegate: Delegate<A>) {
        self.delegate = delegate;
    }

    /// The task calls would currently be forwarded to for `agent`.
    pub fn resolve(&self, agent: &A) -> Option<TaskRef<A>> {
        match &self.delegate {
            Delegate::None => None,
            Delegate::Task(task) => Some(Rc::clone(task)),
            Delegate::Blackboard(key) => agent.blackboard().try_get(*key),
        }
    }

    fn settle(&self, agent: &mut A, delegate: &TaskRef<A>, status: ExecutionStatus) -> ExecutionStatus {
        if status.is_terminal() {
            self.concluded.insert(agent.id(), ());
            conclude(&**delegate, agent, status);
        }
        status
    }
}

impl<A: AgentData> Task<A> for DynamicTask<A> {
    fn name(&self) -> &str {
        "DynamicTask"
    }

    fn score(&self, agent: &A, decision: &mut DecisionData) -> f32 {
        match self.resolve(agent) {
            Some(delegate) => delegate.score(agent, decision),
            None => {
                trace!(agent = ?agent.id(), delegate = ?self.delegate, "dynamic task unresolved");
                0.0
            }
        }
    }

    fn activate(&self, agent: &mut A, decision: DecisionData) -> ExecutionStatus {
        self.concluded.remove(agent.id());
        let Some(delegate) = self.resolve(agent) else {
            return ExecutionStatus::Failure;
        };
        let status = delegate.activate(agent, decision);
        self.settle(agent, &delegate, status)
    }

    fn update(&self, agent: &mut A) -> ExecutionStatus {
        let Some(delegate) = self.resolve(agent) else {
            return ExecutionStatus::Failure;
        };
        let status = delegate.update(agent);
        self.settle(agent, &delegate, status)
    }

    fn deactivate(&self, agent: &mut A) {
        if self.concluded.remove(agent.id()).is_some() {
            return;
        }
        if let Some(delegate) = self.resolve(agent) {
            delegate.deactivate(agent);
        }
    }

    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        Some(&self.on_success)
    }

    // The delegate's active descendants are reported under this node.
    fn append_active_tasks(&self, agent: &A, node: &Rc<TaskNode<A>>, out: &mut Vec<Rc<TaskNode<A>>>) {
        if let Some(delegate) = self.resolve(agent) {
            delegate.append_active_tasks(agent, node, out);
        }
    }
}
