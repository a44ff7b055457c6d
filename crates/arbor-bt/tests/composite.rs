mod common;

use std::cell::RefCell;
use std::rc::Rc;

use arbor_bt::{ChildList, Composite, PrioritySelector, Sequence, StructureError, Task, TaskRef};
use arbor_core::ExecutionStatus;

use common::{task_ref, Scripted, TestAgent};

fn leaf(name: &'static str) -> TaskRef<TestAgent> {
    task_ref(&Scripted::instant(name, ExecutionStatus::Success))
}

fn names(list: &ChildList<TestAgent>) -> Vec<String> {
    list.iter().map(|c| c.name().to_owned()).collect()
}

#[test]
fn add_succeeds_exactly_capacity_times() {
    let mut selector = PrioritySelector::<TestAgent>::new(3);
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        assert_eq!(selector.add_child(leaf(name)), Ok(i));
    }
    assert_eq!(
        selector.add_child(leaf("d")),
        Err(StructureError::CapacityExceeded { capacity: 3 })
    );
    assert_eq!(selector.child_count(), 3);
    assert_eq!(selector.capacity(), 3);
}

#[test]
fn insert_places_child_at_index() {
    let mut list = ChildList::<TestAgent>::with_capacity(4);
    list.add(leaf("a")).unwrap();
    list.add(leaf("c")).unwrap();

    let b = leaf("b");
    list.insert(1, Rc::clone(&b)).unwrap();
    assert_eq!(list.position(&b), Some(1));
    assert_eq!(names(&list), vec!["a", "b", "c"]);

    list.insert(3, leaf("d")).unwrap();
    assert_eq!(names(&list), vec!["a", "b", "c", "d"]);
}

#[test]
fn insert_checks_range_before_capacity() {
    let mut list = ChildList::<TestAgent>::with_capacity(1);
    assert_eq!(
        list.insert(1, leaf("a")),
        Err(StructureError::IndexOutOfRange { index: 1, len: 0 })
    );
    list.insert(0, leaf("a")).unwrap();
    assert_eq!(
        list.insert(0, leaf("b")),
        Err(StructureError::CapacityExceeded { capacity: 1 })
    );
    assert_eq!(
        list.insert(5, leaf("b")),
        Err(StructureError::IndexOutOfRange { index: 5, len: 1 })
    );
}

#[test]
fn move_is_a_pure_permutation() {
    let mut sequence = Sequence::<TestAgent>::new(4);
    for name in ["a", "b", "c", "d"] {
        sequence.add_child(leaf(name)).unwrap();
    }

    sequence.move_child(0, 3).unwrap();
    assert_eq!(names(sequence.child_list()), vec!["b", "c", "d", "a"]);

    sequence.move_child(2, 1).unwrap();
    assert_eq!(names(sequence.child_list()), vec!["b", "d", "c", "a"]);

    assert_eq!(
        sequence.move_child(0, 4),
        Err(StructureError::IndexOutOfRange { index: 4, len: 4 })
    );
    assert_eq!(
        sequence.move_child(4, 0),
        Err(StructureError::IndexOutOfRange { index: 4, len: 4 })
    );
    assert_eq!(sequence.child_count(), 4);

    let mut sorted = names(sequence.child_list());
    sorted.sort();
    assert_eq!(sorted, vec!["a", "b", "c", "d"]);
}

#[test]
fn remove_takes_first_match_and_tolerates_absence() {
    let shared = leaf("shared");
    let mut list = ChildList::<TestAgent>::with_capacity(3);
    list.add(Rc::clone(&shared)).unwrap();
    list.add(leaf("other")).unwrap();
    list.add(Rc::clone(&shared)).unwrap();

    assert!(list.remove(&shared));
    assert_eq!(names(&list), vec!["other", "shared"]);
    assert!(list.remove(&shared));
    assert!(!list.remove(&shared));
    assert_eq!(list.len(), 1);
}

#[test]
fn listeners_fire_after_each_mutation() {
    let events = Rc::new(RefCell::new(Vec::<String>::new()));
    let mut list = ChildList::<TestAgent>::with_capacity(3);

    let added = Rc::clone(&events);
    list.on_child_added(move |index, child| {
        added.borrow_mut().push(format!("+{}@{}", child.name(), index));
    });
    let removed = Rc::clone(&events);
    list.on_child_removed(move |index, child| {
        removed.borrow_mut().push(format!("-{}@{}", child.name(), index));
    });

    let a = leaf("a");
    list.add(Rc::clone(&a)).unwrap();
    list.insert(0, leaf("b")).unwrap();
    list.move_child(0, 1).unwrap();
    list.remove(&a);
    let _ = list.add(leaf("c"));
    let _ = list.add(leaf("d"));
    let _ = list.add(leaf("e"));

    assert_eq!(
        *events.borrow(),
        vec!["+a@0", "+b@0", "-a@0", "+c@1", "+d@2"]
    );
}
