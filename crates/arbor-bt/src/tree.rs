use std::borrow::Cow;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use arbor_core::{AgentData, AgentId, ExecutionStatus};
use arbor_tools::{emit_with, TraceEvent};
use tracing::{debug, trace};

use crate::node::{TaskNode, TreeId};
use crate::task::{conclude, same_task, DecisionData, TaskRef};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeConfig {
    /// Name carried in log records for this tree.
    pub label: Cow<'static, str>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("tree"),
        }
    }
}

/// Per-tick driver for one tree definition shared by many agents.
///
/// The tree itself holds no per-agent state: the episode status lives in the
/// agent's [`AgentData`], everything else in the tasks' own side tables.
pub struct BehaviorTree<A: AgentData> {
    root: Option<TaskRef<A>>,
    config: TreeConfig,
}

impl<A: AgentData> Default for BehaviorTree<A> {
    fn default() -> Self {
        Self {
            root: None,
            config: TreeConfig::default(),
        }
    }
}

impl<A: AgentData> BehaviorTree<A> {
    pub fn new(root: TaskRef<A>) -> Self {
        Self {
            root: Some(root),
            config: TreeConfig::default(),
        }
    }

    /// A tree without a root; every driver call is a no-op until one is set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&TaskRef<A>> {
        self.root.as_ref()
    }

    /// Replaces the root, returning the previous one.
    ///
    /// Agents still running under the old root should be deactivated first.
    pub fn set_root(&mut self, root: Option<TaskRef<A>>) -> Option<TaskRef<A>> {
        std::mem::replace(&mut self.root, root)
    }

    /// Advance `agent` by one tick.
    ///
    /// - `Idle`/`Success`/`Failure`: score the root. A score `<= 0` ends the
    ///   tick with the status unchanged. Otherwise the root is activated, and
    ///   if that leaves it `Running` it is also updated once in the same call.
    /// - `Running`: update the root.
    ///
    /// Whenever the root reports `Success` or `Failure` its episode is
    /// concluded: it is deactivated and, on success, its success signal fires.
    pub fn update(&self, agent: &mut A) {
        let Some(root) = self.root.as_ref() else {
            return;
        };

        agent.set_decider_level(0);
        agent.pre_tick();

        if agent.status().is_running() {
            let status = root.update(agent);
            self.record(root, agent, status, "bt.update");
        } else {
            let mut decision = DecisionData::new();
            let score = root.score(&*agent, &mut decision);
            trace!(tree = %self.config.label, agent = ?agent.id(), score, "scored root");

            if score > 0.0 {
                let status = root.activate(agent, decision);
                debug!(tree = %self.config.label, agent = ?agent.id(), task = root.name(), status = ?status, "activated root");
                self.record(root, agent, status, "bt.activate");

                if status.is_running() {
                    let status = root.update(agent);
                    self.record(root, agent, status, "bt.update");
                }
            } else {
                self.trace(root, agent, "bt.skip");
            }
        }

        agent.post_tick();
    }

    /// Force-stop a running episode.
    ///
    /// Calls the root's `deactivate` if the agent is `Running` and moves the
    /// agent back to `Idle`, so the next [`update`](Self::update) scores the
    /// root for a fresh episode instead of updating the stopped one.
    pub fn deactivate(&self, agent: &mut A) {
        let Some(root) = self.root.as_ref() else {
            return;
        };
        agent.set_decider_level(0);
        if agent.status().is_running() {
            root.deactivate(agent);
            agent.set_status(ExecutionStatus::Idle);
            debug!(tree = %self.config.label, agent = ?agent.id(), task = root.name(), "deactivated root");
            self.trace(root, agent, "bt.deactivate");
        }
    }

    /// Nodes currently active for `agent`, root first.
    ///
    /// `None` without a root or when the agent is not `Running`.
    pub fn active_tasks(&self, agent: &A) -> Option<Vec<Rc<TaskNode<A>>>> {
        let root = self.root.as_ref()?;
        if !agent.status().is_running() {
            return None;
        }
        let node = TaskNode::root(Rc::clone(root));
        let mut out = vec![Rc::clone(&node)];
        root.append_active_tasks(agent, &node, &mut out);
        Some(out)
    }

    /// Depth-first search for `task` (by identity), children in order.
    ///
    /// Subtrees below what a [`TreeId`] can address are not searched.
    pub fn find(&self, task: &TaskRef<A>) -> Option<Rc<TaskNode<A>>> {
        let root = self.root.as_ref()?;
        find_in(&TaskNode::root(Rc::clone(root)), task)
    }

    /// Resolves a packed id back to its node. Malformed ids resolve to `None`.
    pub fn node_at(&self, id: TreeId) -> Option<Rc<TaskNode<A>>> {
        let root = self.root.as_ref()?;
        let mut path = id.indices()?.into_iter();
        if path.next() != Some(0) {
            return None;
        }
        let mut node = TaskNode::root(Rc::clone(root));
        for index in path {
            let child = Rc::clone(node.task().children()?.get(index)?);
            node = node.child(index, child).ok()?;
        }
        Some(node)
    }

    fn record(&self, root: &TaskRef<A>, agent: &mut A, status: ExecutionStatus, tag: &'static str) {
        agent.set_status(status);
        self.trace(root, agent, tag);
        if status.is_terminal() {
            conclude(&**root, agent, status);
            debug!(tree = %self.config.label, agent = ?agent.id(), task = root.name(), status = ?status, "episode finished");
            let tag = if status == ExecutionStatus::Success {
                "bt.success"
            } else {
                "bt.failure"
            };
            self.trace(root, agent, tag);
        }
    }

    fn trace(&self, root: &TaskRef<A>, agent: &mut A, tag: &'static str) {
        let tick = agent.tick();
        let id = agent.id().stable_id();
        let level = agent.decider_level();
        emit_with(agent.blackboard_mut(), || {
            TraceEvent::new(tick, tag)
                .with_agent(id)
                .with_task(root.name().to_owned())
                .with_level(level)
        });
    }
}

fn find_in<A: AgentData>(node: &Rc<TaskNode<A>>, target: &TaskRef<A>) -> Option<Rc<TaskNode<A>>> {
    if same_task(node.task(), target) {
        return Some(Rc::clone(node));
    }
    let children = node.task().children()?;
    for (index, child) in children.iter().enumerate() {
        let Ok(child_node) = node.child(index, Rc::clone(child)) else {
            continue;
        };
        if let Some(found) = find_in(&child_node, target) {
            return Some(found);
        }
    }
    None
}
