use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug};
use std::rc::Rc;

/// Handle returned by [`SuccessSignal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

type Callback<A> = Rc<dyn Fn(&A)>;

/// Callbacks fired when one of a task's episodes ends in `Success`.
///
/// Subscribers must unsubscribe when they go away; the signal holds them
/// strongly.
pub struct SuccessSignal<A> {
    next: Cell<u64>,
    callbacks: RefCell<Vec<(Subscription, Callback<A>)>>,
}

impl<A> Default for SuccessSignal<A> {
    fn default() -> Self {
        Self {
            next: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }
}

impl<A> SuccessSignal<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&A) + 'static) -> Subscription {
        let id = Subscription(self.next.get());
        self.next.set(id.0 + 1);
        let callback: Callback<A> = Rc::new(callback);
        self.callbacks.borrow_mut().push((id, callback));
        id
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != subscription);
        callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Calls every subscriber registered at the time of the call.
    ///
    /// Callbacks may subscribe or unsubscribe; changes apply to the next emit.
    pub fn emit(&self, agent: &A) {
        let snapshot: Vec<Callback<A>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(agent);
        }
    }
}

impl<A> Debug for SuccessSignal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuccessSignal")
            .field("subscribers", &self.len())
            .finish()
    }
}
