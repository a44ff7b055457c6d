mod common;

use std::rc::Rc;

use arbor_bt::{
    BehaviorTree, DecisionData, Inverter, PrioritySelector, SelectorConfig, Sequence, Task, TaskRef,
};
use arbor_core::{AgentData, ExecutionStatus};

use common::{count_successes, task_ref, Scripted, TestAgent};

fn tree_of<T: Task<TestAgent>>(root: T) -> BehaviorTree<TestAgent> {
    BehaviorTree::new(Rc::new(root) as TaskRef<TestAgent>)
}

#[test]
fn selector_runs_the_best_child() {
    let low = Scripted::running("low").with_score(0.3);
    let high = Scripted::running("high").with_score(0.8);
    let selector = PrioritySelector::with_children(2, [task_ref(&low), task_ref(&high)]).unwrap();
    let agent = TestAgent::new(1);

    assert_eq!(selector.score(&agent, &mut DecisionData::new()), 0.8);

    let tree = tree_of(selector);
    let mut agent = agent;
    tree.update(&mut agent);
    assert_eq!(low.activated.get(), 0);
    assert_eq!(high.activated.get(), 1);
}

#[test]
fn ties_go_to_the_earlier_child() {
    let first = Scripted::running("first").with_score(0.5);
    let second = Scripted::running("second").with_score(0.5);
    let tree = tree_of(PrioritySelector::with_children(2, [task_ref(&first), task_ref(&second)]).unwrap());
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(first.activated.get(), 1);
    assert_eq!(second.activated.get(), 0);
}

#[test]
fn min_score_filters_children() {
    let weak = Scripted::running("weak").with_score(0.2);
    let selector = PrioritySelector::with_children(1, [task_ref(&weak)])
        .unwrap()
        .with_config(SelectorConfig { min_score: 0.25 });
    let agent = TestAgent::new(1);

    assert_eq!(selector.config().min_score, 0.25);
    assert_eq!(selector.score(&agent, &mut DecisionData::new()), 0.0);

    weak.score.set(0.3);
    assert_eq!(selector.score(&agent, &mut DecisionData::new()), 0.3);
}

#[test]
fn selector_keeps_its_child_until_it_finishes() {
    let slow = Scripted::finishing("slow", ExecutionStatus::Success).with_score(0.4);
    let urgent = Scripted::running("urgent").with_score(0.0);
    let tree = tree_of(PrioritySelector::with_children(2, [task_ref(&slow), task_ref(&urgent)]).unwrap());
    let slow_successes = count_successes(&slow.on_success);
    let mut agent = TestAgent::new(1);

    slow.updates.borrow_mut().push_front(ExecutionStatus::Running);
    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Running);

    urgent.score.set(1.0);
    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Success);
    assert_eq!(urgent.activated.get(), 0);
    assert_eq!(slow.deactivated.get(), 1);
    assert_eq!(slow_successes.get(), 1);
}

#[test]
fn deactivating_the_tree_reaches_the_running_leaf() {
    let leaf = Scripted::running("leaf");
    let selector = Rc::new(PrioritySelector::with_children(1, [task_ref(&leaf)]).unwrap());
    let tree = BehaviorTree::new(Rc::clone(&selector) as TaskRef<TestAgent>);
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(selector.active_child(1), Some(0));

    tree.deactivate(&mut agent);
    assert_eq!(leaf.deactivated.get(), 1);
    assert_eq!(selector.active_child(1), None);
}

#[test]
fn sequence_chains_children_finishing_in_the_same_tick() {
    let a = Scripted::instant("a", ExecutionStatus::Success);
    let b = Scripted::instant("b", ExecutionStatus::Success);
    let c = Scripted::finishing("c", ExecutionStatus::Success);
    let sequence = Rc::new(Sequence::with_children(3, [task_ref(&a), task_ref(&b), task_ref(&c)]).unwrap());
    let sequence_successes = count_successes(sequence.success_signal().unwrap());
    let tree = BehaviorTree::new(Rc::clone(&sequence) as TaskRef<TestAgent>);
    let mut agent = TestAgent::new(1);

    c.updates.borrow_mut().push_front(ExecutionStatus::Running);
    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Running);
    assert_eq!(sequence.current_child(1), Some(2));
    assert_eq!((a.activated.get(), b.activated.get(), c.activated.get()), (1, 1, 1));
    assert_eq!((a.scored.get(), b.scored.get(), c.scored.get()), (1, 1, 1));

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Success);
    assert_eq!(sequence.current_child(1), None);
    assert_eq!(sequence_successes.get(), 1);
}

#[test]
fn sequence_fails_on_a_failing_child() {
    let a = Scripted::instant("a", ExecutionStatus::Success);
    let b = Scripted::instant("b", ExecutionStatus::Failure);
    let c = Scripted::instant("c", ExecutionStatus::Success);
    let tree = tree_of(Sequence::with_children(3, [task_ref(&a), task_ref(&b), task_ref(&c)]).unwrap());
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Failure);
    assert_eq!(b.deactivated.get(), 1);
    assert_eq!(c.activated.get(), 0);
}

#[test]
fn sequence_fails_when_the_next_child_is_ineligible() {
    let a = Scripted::instant("a", ExecutionStatus::Success);
    let b = Scripted::instant("b", ExecutionStatus::Success).with_score(0.0);
    let tree = tree_of(Sequence::with_children(2, [task_ref(&a), task_ref(&b)]).unwrap());
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Failure);
    assert_eq!(b.scored.get(), 1);
    assert_eq!(b.activated.get(), 0);
}

#[test]
fn idle_from_a_child_counts_as_failure() {
    let lazy = Scripted::instant("lazy", ExecutionStatus::Idle);
    let tree = tree_of(PrioritySelector::with_children(1, [task_ref(&lazy)]).unwrap());
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Failure);
}

#[test]
fn inverter_swaps_outcomes_but_child_signal_still_fires() {
    let leaf = Scripted::instant("leaf", ExecutionStatus::Success);
    let leaf_successes = count_successes(&leaf.on_success);
    let inverter = Rc::new(Inverter::new(task_ref(&leaf)));
    let inverter_successes = count_successes(inverter.success_signal().unwrap());
    let tree = BehaviorTree::new(Rc::clone(&inverter) as TaskRef<TestAgent>);
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Failure);
    assert_eq!(leaf_successes.get(), 1);
    assert_eq!(inverter_successes.get(), 0);

    leaf.on_activate.set(ExecutionStatus::Failure);
    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Success);
    assert_eq!(inverter_successes.get(), 1);
}

#[test]
fn inverter_passes_running_through() {
    let leaf = Scripted::finishing("leaf", ExecutionStatus::Failure);
    leaf.updates.borrow_mut().push_front(ExecutionStatus::Running);
    let tree = tree_of(Inverter::new(task_ref(&leaf)));
    let mut agent = TestAgent::new(1);

    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Running);
    tree.update(&mut agent);
    assert_eq!(agent.status(), ExecutionStatus::Success);
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let leaf = Scripted::instant("leaf", ExecutionStatus::Success);
    let kept = count_successes(&leaf.on_success);
    let dropped = Rc::new(std::cell::Cell::new(0));
    let counter = Rc::clone(&dropped);
    let subscription = leaf.on_success.subscribe(move |_| counter.set(counter.get() + 1));
    assert!(leaf.on_success.unsubscribe(subscription));
    assert!(!leaf.on_success.unsubscribe(subscription));

    let tree = BehaviorTree::new(task_ref(&leaf));
    let mut agent = TestAgent::new(1);
    tree.update(&mut agent);

    assert_eq!(kept.get(), 1);
    assert_eq!(dropped.get(), 0);
    assert_eq!(leaf.on_success.len(), 1);
}
