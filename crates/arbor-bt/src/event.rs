//! Leaf tasks driven by externally signaled, per-agent one-shot events.
//!
//! The first time an agent scores the task it is registered with the event
//! source and scores `0`: events arrive asynchronously and only become visible
//! on a later score. Once an event has been raised for the agent the task
//! scores [`EVENT_PRIORITY`]; activating it consumes the event and runs the
//! handler. Registration is per agent, not per episode, and is torn down when
//! the task is dropped.

use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use arbor_core::{AgentData, AgentId, AgentTable, ExecutionStatus};
use tracing::{debug, trace};

use crate::signal::SuccessSignal;
use crate::task::{DecisionData, Task};

/// Score of an event task with a pending event.
pub const EVENT_PRIORITY: f32 = 1.0;

struct EventSlot<P> {
    occurred: bool,
    payload: Option<P>,
}

impl<P> Default for EventSlot<P> {
    fn default() -> Self {
        Self {
            occurred: false,
            payload: None,
        }
    }
}

// Shared with every `EventSender` (weakly), hence the `Rc` around the table.
type Slots<Id, P> = AgentTable<Id, EventSlot<P>>;

/// Source-specific half of an [`EventTask`].
pub trait EventBinding<A: AgentData>: 'static {
    type Payload: 'static;

    /// Subscribe `agent` to the event source. Called once per agent, on its
    /// first score. `sender` raises the event for that agent.
    fn register(&self, agent: &A, sender: EventSender<A::Id, Self::Payload>);

    /// Undo [`register`](EventBinding::register).
    fn unregister(&self, agent: A::Id);

    /// Reacts to a consumed event during activation.
    fn on_event(&self, agent: &mut A, payload: Self::Payload);
}

/// Raises the event for one registered agent.
///
/// Holds the task weakly: once the task is gone, raising does nothing.
pub struct EventSender<Id, P> {
    agent: Id,
    slots: Weak<Slots<Id, P>>,
}

impl<Id: Copy, P> Clone for EventSender<Id, P> {
    fn clone(&self) -> Self {
        Self {
            agent: self.agent,
            slots: Weak::clone(&self.slots),
        }
    }
}

impl<Id: AgentId, P> EventSender<Id, P> {
    pub fn agent(&self) -> Id {
        self.agent
    }

    /// Marks the event as occurred with `payload`, replacing any unconsumed
    /// payload. Returns `false` if the task or the registration is gone.
    pub fn raise(&self, payload: P) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        raise_in(&slots, self.agent, payload)
    }
}

impl<Id: Debug, P> Debug for EventSender<Id, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}

fn raise_in<Id: AgentId, P>(slots: &Slots<Id, P>, agent: Id, payload: P) -> bool {
    slots
        .with_mut(agent, |slot| {
            slot.occurred = true;
            slot.payload = Some(payload);
        })
        .is_some()
}

pub struct EventTask<A: AgentData, B: EventBinding<A>> {
    binding: B,
    slots: Rc<Slots<A::Id, B::Payload>>,
    on_success: SuccessSignal<A>,
}

impl<A: AgentData, B: EventBinding<A>> EventTask<A, B> {
    pub fn new(binding: B) -> Self {
        Self {
            binding,
            slots: Rc::new(AgentTable::new()),
            on_success: SuccessSignal::new(),
        }
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn is_registered(&self, agent: A::Id) -> bool {
        self.slots.contains(agent)
    }

    /// Whether an unconsumed event is waiting for `agent`.
    pub fn is_pending(&self, agent: A::Id) -> bool {
        self.slots.with(agent, |slot| slot.occurred).unwrap_or(false)
    }

    pub fn registered_agents(&self) -> Vec<A::Id> {
        self.slots.ids()
    }

    /// Raises the event for a registered agent. See [`EventSender::raise`].
    pub fn raise(&self, agent: A::Id, payload: B::Payload) -> bool {
        raise_in(&self.slots, agent, payload)
    }

    /// Drops `agent`'s registration, e.g. when the agent is destroyed.
    pub fn unregister(&self, agent: A::Id) -> bool {
        if self.slots.remove(agent).is_none() {
            return false;
        }
        self.binding.unregister(agent);
        debug!(agent = ?agent, "event task unregistered agent");
        true
    }
}

impl<A: AgentData, B: EventBinding<A>> Task<A> for EventTask<A, B> {
    fn name(&self) -> &str {
        "EventTask"
    }

    fn score(&self, agent: &A, _decision: &mut DecisionData) -> f32 {
        let id = agent.id();
        let occurred = self.slots.with(id, |slot| slot.occurred);
        match occurred {
            None => {
                self.slots.insert(id, EventSlot::default());
                let sender = EventSender {
                    agent: id,
                    slots: Rc::downgrade(&self.slots),
                };
                self.binding.register(agent, sender);
                debug!(agent = ?id, "event task registered agent");
                0.0
            }
            Some(true) => EVENT_PRIORITY,
            Some(false) => 0.0,
        }
    }

    fn activate(&self, agent: &mut A, _decision: DecisionData) -> ExecutionStatus {
        let id = agent.id();
        let payload = self
            .slots
            .with_mut(id, |slot| {
                if !slot.occurred {
                    return None;
                }
                slot.occurred = false;
                slot.payload.take()
            })
            .flatten();
        match payload {
            Some(payload) => {
                self.binding.on_event(agent, payload);
                ExecutionStatus::Success
            }
            None => {
                trace!(agent = ?id, "event consumed before activation");
                ExecutionStatus::Failure
            }
        }
    }

    // Episodes end inside `activate`; nothing is left to update.
    fn update(&self, _agent: &mut A) -> ExecutionStatus {
        ExecutionStatus::Failure
    }

    fn deactivate(&self, _agent: &mut A) {}

    fn success_signal(&self) -> Option<&SuccessSignal<A>> {
        Some(&self.on_success)
    }
}

impl<A: AgentData, B: EventBinding<A>> Drop for EventTask<A, B> {
    fn drop(&mut self) {
        for (agent, _) in self.slots.drain() {
            self.binding.unregister(agent);
        }
    }
}

impl<A: AgentData, B: EventBinding<A> + Debug> Debug for EventTask<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTask")
            .field("binding", &self.binding)
            .field("registered", &self.slots.len())
            .finish()
    }
}
