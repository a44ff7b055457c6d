#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use arbor_bt::{DecisionData, SuccessSignal, Task, TaskRef};
use arbor_core::{Agent, AgentData, ExecutionStatus};

pub type TestAgent = Agent<u64>;

/// Leaf whose answers are fixed up front. Counts every lifecycle call.
pub struct Scripted {
    pub name: &'static str,
    pub score: Cell<f32>,
    pub on_activate: Cell<ExecutionStatus>,
    pub updates: RefCell<VecDeque<ExecutionStatus>>,
    pub fallback_update: Cell<ExecutionStatus>,
    pub scored: Cell<u32>,
    pub activated: Cell<u32>,
    pub updated: Cell<u32>,
    pub deactivated: Cell<u32>,
    pub max_level: Cell<u32>,
    pub on_success: SuccessSignal<TestAgent>,
}

impl Scripted {
    pub fn new(name: &'static str, score: f32, on_activate: ExecutionStatus) -> Self {
        Self {
            name,
            score: Cell::new(score),
            on_activate: Cell::new(on_activate),
            updates: RefCell::new(VecDeque::new()),
            fallback_update: Cell::new(ExecutionStatus::Running),
            scored: Cell::new(0),
            activated: Cell::new(0),
            updated: Cell::new(0),
            deactivated: Cell::new(0),
            max_level: Cell::new(0),
            on_success: SuccessSignal::new(),
        }
    }

    /// Scores `1`, starts `Running` and keeps running.
    pub fn running(name: &'static str) -> Rc<Self> {
        Rc::new(Self::new(name, 1.0, ExecutionStatus::Running))
    }

    /// Scores `1`, starts `Running`, then reports `outcome` on its first update.
    pub fn finishing(name: &'static str, outcome: ExecutionStatus) -> Rc<Self> {
        let task = Self::new(name, 1.0, ExecutionStatus::Running);
        task.updates.borrow_mut().push_back(outcome);
        Rc::new(task)
    }

    /// Scores `1` and finishes inside `activate`.
    pub fn instant(name: &'static str, outcome: ExecutionStatus) -> Rc<Self> {
        Rc::new(Self::new(name, 1.0, outcome))
    }

    pub fn with_score(self: Rc<Self>, score: f32) -> Rc<Self> {
        self.score.set(score);
        self
    }

    fn note_level(&self, agent: &TestAgent) {
        self.max_level.set(self.max_level.get().max(agent.decider_level()));
    }
}

impl Task<TestAgent> for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn score(&self, _agent: &TestAgent, _decision: &mut DecisionData) -> f32 {
        self.scored.set(self.scored.get() + 1);
        self.score.get()
    }

    fn activate(&self, agent: &mut TestAgent, _decision: DecisionData) -> ExecutionStatus {
        self.note_level(agent);
        self.activated.set(self.activated.get() + 1);
        self.on_activate.get()
    }

    fn update(&self, agent: &mut TestAgent) -> ExecutionStatus {
        self.note_level(agent);
        self.updated.set(self.updated.get() + 1);
        self.updates
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.fallback_update.get())
    }

    fn deactivate(&self, _agent: &mut TestAgent) {
        self.deactivated.set(self.deactivated.get() + 1);
    }

    fn success_signal(&self) -> Option<&SuccessSignal<TestAgent>> {
        Some(&self.on_success)
    }
}

pub fn task_ref(task: &Rc<Scripted>) -> TaskRef<TestAgent> {
    Rc::clone(task) as TaskRef<TestAgent>
}

/// Counter bumped by a success subscription.
pub fn count_successes(signal: &SuccessSignal<TestAgent>) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    signal.subscribe(move |_agent| counter.set(counter.get() + 1));
    count
}
