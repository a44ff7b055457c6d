#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use arbor_core::{BbKey, Blackboard};

/// One engine-level occurrence during a tick, such as a root activation.
///
/// Plain data so it can be recorded during simulation and rendered later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    /// `AgentId::stable_id` of the agent being driven.
    pub agent: u64,
    pub task: Cow<'static, str>,
    pub level: u32,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            agent: 0,
            task: Cow::Borrowed(""),
            level: 0,
        }
    }

    pub fn with_agent(mut self, agent: u64) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_task(mut self, task: impl Into<Cow<'static, str>>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// Receiver for streamed events, stored under [`TRACE_SINK`].
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Tags in recording order.
    pub fn tags(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.tag.as_ref()).collect()
    }
}

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new("arbor.trace.log");
/// Blackboard key for streaming events into a user-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new("arbor.trace.sink");

/// Whether the blackboard carries a log or a sink. Only local entries count.
pub fn is_tracing(blackboard: &Blackboard) -> bool {
    blackboard.get_local(TRACE_LOG).is_some() || blackboard.get_local(TRACE_SINK).is_some()
}

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_local_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_local_mut(TRACE_SINK) {
        sink.emit(event);
    }
}

/// Like [`emit`], but only builds the event when someone is listening.
pub fn emit_with(blackboard: &mut Blackboard, make: impl FnOnce() -> TraceEvent) {
    if is_tracing(blackboard) {
        emit(blackboard, make());
    }
}
