//! Promptfile Engine
//!
//! The per-invocation execution pipeline. One invocation walks a fixed state
//! machine - fetch declared sources, hand the accumulated data to the
//! generation collaborator, run declared result actions - and emits
//! structured events carrying the invocation's correlation id along the way.
//! The generation collaborator itself is a black box behind the [`Generator`]
//! trait.

mod error;
mod events;
mod generator;
mod pipeline;

pub use error::PipelineError;
pub use events::{ChannelNotifier, EventNotifier, ExecutionEvent, NoopNotifier, unix_millis};
pub use generator::{GenerateError, Generator};
pub use pipeline::{Pipeline, PipelineState};
