//! Provider capability traits.

use std::sync::Arc;

use async_trait::async_trait;
use promptfile_config::RequestContext;
use serde_json::Value;

use crate::error::ProviderError;
use crate::flow::BoundFlow;

/// Fetch capability: produces data for one source property before generation.
/// The config has already had its string leaves template-rendered.
#[async_trait]
pub trait DataSourceProvider: Send + Sync {
  fn name(&self) -> &str;

  async fn fetch_data(
    &self,
    request: &RequestContext,
    config: &Value,
  ) -> Result<Value, ProviderError>;
}

impl std::fmt::Debug for dyn DataSourceProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DataSourceProvider")
      .field("name", &self.name())
      .finish_non_exhaustive()
  }
}

/// Execute capability: runs one side-effecting result action after
/// generation. `scope` holds every fetched source, the request, and the
/// generated output under `"output"`.
#[async_trait]
pub trait DataActionProvider: Send + Sync {
  fn name(&self) -> &str;

  async fn execute(
    &self,
    request: &RequestContext,
    config: &Value,
    scope: &Value,
  ) -> Result<(), ProviderError>;
}

/// Trigger capability: manufactures recurring-job factories.
pub trait TriggerProvider: Send + Sync {
  fn name(&self) -> &str;

  fn create_trigger(&self) -> Arc<dyn Trigger>;
}

/// Factory producing one scheduled task per trigger-bearing flow.
pub trait Trigger: Send + Sync {
  /// Bind `flow` to a schedule described by `config`. The task starts
  /// unstarted. Config validation failures here abort the catalog build.
  fn create(&self, flow: BoundFlow, config: &Value)
  -> Result<Arc<dyn ScheduledTask>, ProviderError>;
}

/// Lifecycle state of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Created,
  Started,
  Stopped,
}

/// A recurring job bound to one flow.
pub trait ScheduledTask: Send + Sync {
  fn start(&self);
  fn stop(&self);
  fn state(&self) -> TaskState;
}

impl std::fmt::Debug for dyn ScheduledTask {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ScheduledTask")
      .field("state", &self.state())
      .finish_non_exhaustive()
  }
}

/// A named bundle of provider capabilities. Every constructor is optional;
/// a plugin offers whichever capabilities it implements.
pub trait ProviderPlugin: Send + Sync {
  fn name(&self) -> &str;

  fn create_data_source(&self) -> Option<Arc<dyn DataSourceProvider>> {
    None
  }

  fn create_data_action(&self) -> Option<Arc<dyn DataActionProvider>> {
    None
  }

  fn create_trigger_provider(&self) -> Option<Arc<dyn TriggerProvider>> {
    None
  }

  /// Secret keys this plugin requires, checked by the config-validation pass
  /// at startup.
  fn required_secrets(&self) -> Vec<String> {
    Vec::new()
  }
}
