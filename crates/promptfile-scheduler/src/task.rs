//! A cron-scheduled task bound to one flow.

use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use promptfile_config::RequestContext;
use promptfile_engine::{EventNotifier, ExecutionEvent, unix_millis};
use promptfile_registry::{BoundFlow, ProviderError, ScheduledTask, TaskState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Parse a cron expression, accepting the common 5-field form by treating it
/// as firing at second zero.
pub fn parse_schedule(expression: &str) -> Result<Schedule, ProviderError> {
  let fields = expression.split_whitespace().count();
  let normalized = if fields == 5 {
    format!("0 {expression}")
  } else {
    expression.to_string()
  };
  Schedule::from_str(&normalized).map_err(|e| {
    ProviderError::invalid_config("schedule", format!("bad cron expression '{expression}': {e}"))
  })
}

/// One recurring job: runs its flow on each cron fire until stopped. Ticks
/// run sequentially; a tick that outlasts the next fire time delays it
/// rather than overlapping it.
pub struct CronTask {
  flow: BoundFlow,
  schedule: Schedule,
  notifier: Arc<dyn EventNotifier>,
  state: Mutex<TaskState>,
  cancel: Mutex<CancellationToken>,
}

impl CronTask {
  pub fn new(flow: BoundFlow, schedule: Schedule, notifier: Arc<dyn EventNotifier>) -> Self {
    Self {
      flow,
      schedule,
      notifier,
      state: Mutex::new(TaskState::Created),
      cancel: Mutex::new(CancellationToken::new()),
    }
  }

  /// Run one tick immediately: synthesize an empty request and invoke the
  /// flow through the same pipeline an HTTP request would use. A failing
  /// tick is reported as an event and never propagates; the schedule
  /// continues on its next tick.
  pub async fn tick(&self) {
    run_tick(&self.flow, &self.notifier).await;
  }
}

impl ScheduledTask for CronTask {
  fn start(&self) {
    {
      let mut state = self.state.lock().expect("task state lock poisoned");
      if *state == TaskState::Started {
        return;
      }
      *state = TaskState::Started;
    }

    let cancel = CancellationToken::new();
    *self.cancel.lock().expect("task cancel lock poisoned") = cancel.clone();

    let flow = self.flow.clone();
    let schedule = self.schedule.clone();
    let notifier = self.notifier.clone();
    info!(route = %flow.route, "task schedule started");
    tokio::spawn(async move {
      loop {
        let next = match schedule.upcoming(Utc).next() {
          Some(next) => next,
          None => break,
        };
        let delay = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

        tokio::select! {
          _ = cancel.cancelled() => break,
          _ = tokio::time::sleep(delay) => run_tick(&flow, &notifier).await,
        }
      }
    });
  }

  fn stop(&self) {
    let mut state = self.state.lock().expect("task state lock poisoned");
    if *state == TaskState::Stopped {
      return;
    }
    *state = TaskState::Stopped;
    self
      .cancel
      .lock()
      .expect("task cancel lock poisoned")
      .cancel();
    info!(route = %self.flow.route, "task schedule stopped");
  }

  fn state(&self) -> TaskState {
    *self.state.lock().expect("task state lock poisoned")
  }
}

/// Invoke `flow` against a synthetic empty request, reporting the generated
/// output as a `TaskCompleted` event and failure as `TaskError`.
async fn run_tick(flow: &BoundFlow, notifier: &Arc<dyn EventNotifier>) {
  let request = RequestContext::synthetic();
  let request_id = request.request_id.clone();

  match (flow.invoker)(request).await {
    Ok(output) => {
      notifier.notify(ExecutionEvent::TaskCompleted {
        request_id,
        route: flow.route.clone(),
        output,
        timestamp_ms: unix_millis(),
      });
    }
    Err(e) => {
      error!(route = %flow.route, request_id, error = %e, "scheduled tick failed");
      notifier.notify(ExecutionEvent::TaskError {
        request_id,
        route: flow.route.clone(),
        error: e.to_string(),
        timestamp_ms: unix_millis(),
      });
    }
  }
}
