//! Tooling primitives for arbor behavior trees.
//!
//! Trace events are routed through the agent's blackboard so tooling can opt in
//! per agent without the engine knowing about it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, emit_with, is_tracing, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};
