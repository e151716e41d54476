//! Execution events and notifiers for observability.
//!
//! Events are emitted during flow invocations and task lifecycle changes so
//! consumers can observe progress, stream to UIs, etc. The core never
//! persists or formats them, only emits.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// Events emitted by the pipeline, catalog and task manager. Every
/// invocation-scoped event carries the invocation's correlation id.
#[derive(Debug, Clone, Serialize)]
pub enum ExecutionEvent {
  /// A flow invocation has started.
  RequestStarted {
    request_id: String,
    flow: String,
    timestamp_ms: u64,
  },

  /// One declared source was fetched.
  SourceFetched {
    request_id: String,
    flow: String,
    provider: String,
    property: String,
    timestamp_ms: u64,
  },

  /// One result action was executed.
  ActionExecuted {
    request_id: String,
    flow: String,
    provider: String,
    property: String,
    timestamp_ms: u64,
  },

  /// The invocation completed and produced output.
  RequestCompleted {
    request_id: String,
    flow: String,
    timestamp_ms: u64,
  },

  /// The invocation failed.
  RequestFailed {
    request_id: String,
    flow: String,
    error: String,
    timestamp_ms: u64,
  },

  /// A trigger-bearing flow was compiled into a task.
  TaskCreated {
    route: String,
    provider: String,
    timestamp_ms: u64,
  },

  /// A task's schedule was started.
  TaskStarted { route: String, timestamp_ms: u64 },

  /// A tick completed, carrying the generated output.
  TaskCompleted {
    request_id: String,
    route: String,
    output: Value,
    timestamp_ms: u64,
  },

  /// A task's schedule was stopped.
  TaskStopped { route: String, timestamp_ms: u64 },

  /// A tick failed. The schedule continues on its next tick.
  TaskError {
    request_id: String,
    route: String,
    error: String,
    timestamp_ms: u64,
  },

  /// All tasks were stopped and cleared.
  TaskCleanup { timestamp_ms: u64 },
}

/// Trait for receiving execution events. The core calls `notify` for each
/// event; implementations decide what to do with them.
pub trait EventNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl EventNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {
    // Intentionally empty
  }
}

/// A notifier that sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never blocks the pipeline; event volume is a
/// handful per invocation.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl EventNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - the receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

/// Current unix time in milliseconds, for event timestamps.
pub fn unix_millis() -> u64 {
  use std::time::{SystemTime, UNIX_EPOCH};
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}
