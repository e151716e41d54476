//! The built-in `schedule` trigger provider.

use std::sync::Arc;

use promptfile_engine::EventNotifier;
use promptfile_registry::{
  BoundFlow, ProviderError, ProviderPlugin, ScheduledTask, Trigger, TriggerProvider,
};
use serde_json::Value;

use crate::task::{CronTask, parse_schedule};

pub const PROVIDER_NAME: &str = "schedule";

/// Plugin offering the cron trigger capability under the name `schedule`.
pub struct SchedulePlugin {
  notifier: Arc<dyn EventNotifier>,
}

impl SchedulePlugin {
  pub fn new(notifier: Arc<dyn EventNotifier>) -> Self {
    Self { notifier }
  }
}

impl ProviderPlugin for SchedulePlugin {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  fn create_trigger_provider(&self) -> Option<Arc<dyn TriggerProvider>> {
    Some(Arc::new(ScheduleTriggerProvider {
      notifier: self.notifier.clone(),
    }))
  }
}

pub struct ScheduleTriggerProvider {
  notifier: Arc<dyn EventNotifier>,
}

impl TriggerProvider for ScheduleTriggerProvider {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  fn create_trigger(&self) -> Arc<dyn Trigger> {
    Arc::new(ScheduleTrigger {
      notifier: self.notifier.clone(),
    })
  }
}

/// Binds one flow to a cron expression. The config is either a bare
/// expression string or `{cron: "..."}`.
pub struct ScheduleTrigger {
  notifier: Arc<dyn EventNotifier>,
}

impl Trigger for ScheduleTrigger {
  fn create(
    &self,
    flow: BoundFlow,
    config: &Value,
  ) -> Result<Arc<dyn ScheduledTask>, ProviderError> {
    let expression = match config {
      Value::String(expression) => expression.as_str(),
      Value::Object(map) => map
        .get("cron")
        .and_then(Value::as_str)
        .ok_or_else(|| {
          ProviderError::invalid_config(PROVIDER_NAME, "expected a 'cron' expression string")
        })?,
      _ => {
        return Err(ProviderError::invalid_config(
          PROVIDER_NAME,
          "expected a cron expression string or {cron: \"...\"}",
        ));
      }
    };

    let schedule = parse_schedule(expression)?;
    Ok(Arc::new(CronTask::new(
      flow,
      schedule,
      self.notifier.clone(),
    )))
  }
}
