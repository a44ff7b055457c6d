//! Reference composites.
//!
//! The composite contract leaves child selection to each composite; these are
//! the policies most trees start from. Per-agent progress lives in
//! [`AgentTable`]s because every agent shares the same composite instance.

use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use arbor_core::{AgentData, AgentTable, ExecutionStatus};
use tracing::trace;

use crate::composite::{ChildList, Composite};
use crate::error::StructureError;
use crate::node::{append_active_child, TaskNode};
use crate::signal::SuccessSignal;
use crate::task::{conclude, descend, DecisionData, Task, TaskRef};

/// Child picked during `score`, carried to `activate`.
struct Choice {
    index: usize,
    decision: DecisionData,
}

fn build_children<A: AgentData>(
    capacity: usize,
    children: impl IntoIterator<Item = TaskRef<A>>,
) -> Result<ChildList<A>, StructureError> {
    let mut list = ChildList::with_capacity(capacity);
    for child in children {
        list.add(child)?;
    }
    Ok(list)
}

// A child reporting `Idle` from activate/update is treated as failed.
fn normalize(status: ExecutionStatus) -> ExecutionStatus {
    match status {
        ExecutionStatus::Idle => ExecutionStatus::Failure,
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectorConfig {
    /// Children scoring at or below this value are ineligible.
    pub min_score: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

/// Runs the highest-scoring eligible child.
///
/// Ties go to the earlier child. The selector's own score is the winning
/// child's score. Once a child is running it keeps running until it finishes or
/// the selector is deactivated; scores are not re-evaluated mid-episode.
pub struct PrioritySelector<A: AgentData> {
    children: ChildList<A>,
    config: SelectorConfig,
    active: AgentTable<A::Id, usize>,
    on_success: SuccessSignal<A>,
}

impl<A: AgentData> PrioritySelector<A> {
    pub fn new(capacity: usize) -> Self {
        Self {
            children: ChildList::with_capacity(capacity),
            config: SelectorConfig::default(),
            active: AgentTable::new(),
            on_success: SuccessSignal::new(),
        }
    }

    pub fn with_children(
        capacity: usize,
        children: impl IntoIterator<Item = TaskRef<A>>,
    ) -> Result<Self, StructureError> {
        let mut selector = Self::new(capacity);
        selector.children = build_children(capacity, children)?;
        Ok(selector)
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> SelectorConfig {
        self.config
    }

    /// Index of the child running for `agent`, if any.
    pub fn active_child(&self, agent: A::Id) -> Option<usize> {
        self.active.get(agent)
    }

    fn settle(&self, agent: &mut A, index: usize, child: &TaskRef<A>, status: ExecutionStatus) -> ExecutionStatus {
        let status = normalize(status);
        if status.is_running() {
            self.active.insert(agent.id(), index);
        } else {
            self.active.remove(agent.id());
            descend(agent, |agent| conclude(&**child, agent, status));
        }
        status
    }
}

impl<A: AgentData> Task<A> for PrioritySelector<A> {
    fn name(&self) -> &str {
        "PrioritySelector"
    }

    fn score(&self, agent: &A, decision: &mut DecisionData) -> f32 {
        let mut best: Option<(f32, Choice)> = None;
        for (index, child) in self.children.iter().enumerate() {
            let mut child_decision = DecisionData::new();
            let score = child.score(agent, &mut child_decision);
            if score.is_nan() || score <= self.config.min_score {
                continue;
            }
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((
                    score,
                    Choice {
                        index,
                        decision: child_decision,
                    },
                ));
            }
        }

        match best {
            Some((score, choice)) => {
                trace!(agent = ?agent.id(), child = choice.index, score, "selector picked child");
                decision.set(choice);
                score
            }
            None => 0.0,
        }
    }

    fn activate(&self, agent: &mut A, mut decision: DecisionData) -> ExecutionStatus {
        let Some(choice) = decision.take::<Choice>() else {
            return ExecutionStatus::Failure;
        };
        let Some(child) = self.children.get(choice.index).cloned() else {
            return ExecutionStatus::Failure;
        };
        let status = descend(agent, |agent| child.activate(agent, choice.decision));
        self.settle(agent, choice.index, &child, status)
    }

    fn update(&self, agent: &mut A) -> ExecutionStatus {
        let Some(index) = self.active.get(agent.id()) else {
            return ExecutionStatus::Failure;
        };
        let Some(child) = self.children.get(index).cloned() else {
            self.active.remove(agent.id());
            return ExecutionStatus::Failure;
        };
        let status = descend(agent, |agent| child.update(agent));
        self.settle(agent, index, &child, status)
    }

    fn deactivate(&self, agent: &mut A) {
        let Some(index) = self.active.remove(agent.id()) else {
            return;
        };
        if let Some(child) = self.children.get(index).cloned() {
            descend(agent, |agent| child.deactivate(agent));
        }
    }

    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        Some(&self.on_success)
    }

    fn children(&self) -> Option<&ChildList<A>> {
        Some(&self.children)
    }

    fn append_active_tasks(&self, agent: &A, node: &Rc<TaskNode<A>>, out: &mut Vec<Rc<TaskNode<A>>>) {
        let Some(index) = self.active.get(agent.id()) else {
            return;
        };
        if let Some(child) = self.children.get(index) {
            append_active_child(agent, node, index, child, out);
        }
    }
}

impl<A: AgentData> Composite<A> for PrioritySelector<A> {
    fn child_list(&self) -> &ChildList<A> {
        &self.children
    }

    fn child_list_mut(&mut self) -> &mut ChildList<A> {
        &mut self.children
    }
}

/// Runs children in order until one fails.
///
/// Eligibility is the first child's score. Each later child is scored just
/// before it is activated; a non-positive score fails the sequence. Children
/// that finish within the same tick chain into the next one immediately.
pub struct Sequence<A: AgentData> {
    children: ChildList<A>,
    current: AgentTable<A::Id, usize>,
    on_success: SuccessSignal<A>,
}

impl<A: AgentData> Sequence<A> {
    pub fn new(capacity: usize) -> Self {
        Self {
            children: ChildList::with_capacity(capacity),
            current: AgentTable::new(),
            on_success: SuccessSignal::new(),
        }
    }

    pub fn with_children(
        capacity: usize,
        children: impl IntoIterator<Item = TaskRef<A>>,
    ) -> Result<Self, StructureError> {
        let mut sequence = Self::new(capacity);
        sequence.children = build_children(capacity, children)?;
        Ok(sequence)
    }

    /// Index of the child running for `agent`, if any.
    pub fn current_child(&self, agent: A::Id) -> Option<usize> {
        self.current.get(agent)
    }

    fn proceed(&self, agent: &mut A, mut index: usize, mut status: ExecutionStatus) -> ExecutionStatus {
        loop {
            let Some(child) = self.children.get(index).cloned() else {
                self.current.remove(agent.id());
                return ExecutionStatus::Failure;
            };
            match normalize(status) {
                ExecutionStatus::Running => {
                    self.current.insert(agent.id(), index);
                    return ExecutionStatus::Running;
                }
                ExecutionStatus::Success => {
                    descend(agent, |agent| conclude(&*child, agent, ExecutionStatus::Success));
                    index += 1;
                    let Some(next) = self.children.get(index).cloned() else {
                        self.current.remove(agent.id());
                        return ExecutionStatus::Success;
                    };
                    let mut decision = DecisionData::new();
                    let score = next.score(agent, &mut decision);
                    if score.is_nan() || score <= 0.0 {
                        trace!(agent = ?agent.id(), child = index, score, "sequence child ineligible");
                        self.current.remove(agent.id());
                        return ExecutionStatus::Failure;
                    }
                    status = descend(agent, |agent| next.activate(agent, decision));
                }
                _ => {
                    descend(agent, |agent| conclude(&*child, agent, ExecutionStatus::Failure));
                    self.current.remove(agent.id());
                    return ExecutionStatus::Failure;
                }
            }
        }
    }
}

impl<A: AgentData> Task<A> for Sequence<A> {
    fn name(&self) -> &str {
        "Sequence"
    }

    fn score(&self, agent: &A, decision: &mut DecisionData) -> f32 {
        let Some(first) = self.children.get(0) else {
            return 0.0;
        };
        let mut child_decision = DecisionData::new();
        let score = first.score(agent, &mut child_decision);
        decision.set(Choice {
            index: 0,
            decision: child_decision,
        });
        score
    }

    fn activate(&self, agent: &mut A, mut decision: DecisionData) -> ExecutionStatus {
        let Some(choice) = decision.take::<Choice>() else {
            return ExecutionStatus::Failure;
        };
        let Some(child) = self.children.get(choice.index).cloned() else {
            return ExecutionStatus::Failure;
        };
        let status = descend(agent, |agent| child.activate(agent, choice.decision));
        self.proceed(agent, choice.index, status)
    }

    fn update(&self, agent: &mut A) -> ExecutionStatus {
        let Some(index) = self.current.get(agent.id()) else {
            return ExecutionStatus::Failure;
        };
        let Some(child) = self.children.get(index).cloned() else {
            self.current.remove(agent.id());
            return ExecutionStatus::Failure;
        };
        let status = descend(agent, |agent| child.update(agent));
        self.proceed(agent, index, status)
    }

    fn deactivate(&self, agent: &mut A) {
        let Some(index) = self.current.remove(agent.id()) else {
            return;
        };
        if let Some(child) = self.children.get(index).cloned() {
            descend(agent, |agent| child.deactivate(agent));
        }
    }

    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        Some(&self.on_success)
    }

    fn children(&self) -> Option<&ChildList<A>> {
        Some(&self.children)
    }

    fn append_active_tasks(&self, agent: &A, node: &Rc<TaskNode<A>>, out: &mut Vec<Rc<TaskNode<A>>>) {
        let Some(index) = self.current.get(agent.id()) else {
            return;
        };
        if let Some(child) = self.children.get(index) {
            append_active_child(agent, node, index, child, out);
        }
    }
}

impl<A: AgentData> Composite<A> for Sequence<A> {
    fn child_list(&self) -> &ChildList<A> {
        &self.children
    }

    fn child_list_mut(&mut self) -> &mut ChildList<A> {
        &mut self.children
    }
}

/// Single-child decorator that swaps `Success` and `Failure`.
///
/// The child's own success signal still fires when the child succeeds.
pub struct Inverter<A: AgentData> {
    child: ChildList<A>,
    running: AgentTable<A::Id, ()>,
    on_success: SuccessSignal<A>,
}

impl<A: AgentData> Inverter<A> {
    pub fn new(child: TaskRef<A>) -> Self {
        let mut list = ChildList::with_capacity(1);
        // A fresh list of capacity 1 always accepts its first child.
        let _ = list.add(child);
        Self {
            child: list,
            running: AgentTable::new(),
            on_success: SuccessSignal::new(),
        }
    }

    fn settle(&self, agent: &mut A, child: &TaskRef<A>, status: ExecutionStatus) -> ExecutionStatus {
        match normalize(status) {
            ExecutionStatus::Running => {
                self.running.insert(agent.id(), ());
                ExecutionStatus::Running
            }
            status => {
                self.running.remove(agent.id());
                descend(agent, |agent| conclude(&**child, agent, status));
                if status == ExecutionStatus::Success {
                    ExecutionStatus::Failure
                } else {
                    ExecutionStatus::Success
                }
            }
        }
    }
}

impl<A: AgentData> Task<A> for Inverter<A> {
    fn name(&self) -> &str {
        "Inverter"
    }

    fn score(&self, agent: &A, decision: &mut DecisionData) -> f32 {
        match self.child.get(0) {
            Some(child) => child.score(agent, decision),
            None => 0.0,
        }
    }

    fn activate(&self, agent: &mut A, decision: DecisionData) -> ExecutionStatus {
        let Some(child) = self.child.get(0).cloned() else {
            return ExecutionStatus::Failure;
        };
        let status = descend(agent, |agent| child.activate(agent, decision));
        self.settle(agent, &child, status)
    }

    fn update(&self, agent: &mut A) -> ExecutionStatus {
        let Some(child) = self.child.get(0).cloned() else {
            return ExecutionStatus::Failure;
        };
        if !self.running.contains(agent.id()) {
            return ExecutionStatus::Failure;
        }
        let status = descend(agent, |agent| child.update(agent));
        self.settle(agent, &child, status)
    }

    fn deactivate(&self, agent: &mut A) {
        if self.running.remove(agent.id()).is_none() {
            return;
        }
        if let Some(child) = self.child.get(0).cloned() {
            descend(agent, |agent| child.deactivate(agent));
        }
    }

    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        Some(&self.on_success)
    }

    fn children(&self) -> Option<&ChildList<A>> {
        Some(&self.child)
    }

    fn append_active_tasks(&self, agent: &A, node: &Rc<TaskNode<A>>, out: &mut Vec<Rc<TaskNode<A>>>) {
        if !self.running.contains(agent.id()) {
            return;
        }
        if let Some(child) = self.child.get(0) {
            append_active_child(agent, node, 0, child, out);
        }
    }
}

impl<A: AgentData> Composite<A> for Inverter<A> {
    fn child_list(&self) -> &ChildList<A> {
        &self.child
    }

    fn child_list_mut(&mut self) -> &mut ChildList<A> {
        &mut self.child
    }
}
