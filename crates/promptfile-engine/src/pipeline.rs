//! The per-invocation execution pipeline.

use std::sync::Arc;

use promptfile_config::{FlowDefinition, RequestContext};
use promptfile_registry::ProviderRegistry;
use promptfile_template::TemplateResolver;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::error::PipelineError;
use crate::events::{EventNotifier, ExecutionEvent, unix_millis};
use crate::generator::Generator;

/// States one invocation moves through. Transitions are strictly forward;
/// the first failure moves straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
  Idle,
  FetchingSources,
  Generating,
  ExecutingActions,
  Complete,
  Failed,
}

/// Runs flow invocations: fetch declared sources, generate, run declared
/// result actions. Shared and read-only; every invocation gets its own
/// accumulator, so concurrent invocations never interfere.
pub struct Pipeline {
  registry: Arc<ProviderRegistry>,
  generator: Arc<dyn Generator>,
  resolver: TemplateResolver,
  notifier: Arc<dyn EventNotifier>,
}

impl Pipeline {
  pub fn new(
    registry: Arc<ProviderRegistry>,
    generator: Arc<dyn Generator>,
    notifier: Arc<dyn EventNotifier>,
  ) -> Self {
    Self {
      registry,
      generator,
      resolver: TemplateResolver::new(),
      notifier,
    }
  }

  /// Run one invocation of `flow` against `request`, returning the generated
  /// output. Errors are wrapped with the offending provider/property and the
  /// request's correlation id.
  #[instrument(
    name = "pipeline_run",
    skip(self, flow, request),
    fields(flow = %flow.name, request_id = %request.request_id)
  )]
  pub async fn run(
    &self,
    flow: &FlowDefinition,
    request: RequestContext,
  ) -> Result<Value, PipelineError> {
    let request_id = request.request_id.clone();
    info!("invocation started");
    self.notifier.notify(ExecutionEvent::RequestStarted {
      request_id: request_id.clone(),
      flow: flow.name.clone(),
      timestamp_ms: unix_millis(),
    });

    let result = self.run_inner(flow, &request).await;

    match &result {
      Ok(_) => {
        info!("invocation completed");
        self.notifier.notify(ExecutionEvent::RequestCompleted {
          request_id,
          flow: flow.name.clone(),
          timestamp_ms: unix_millis(),
        });
      }
      Err(e) => {
        error!(error = %e, "invocation failed");
        self.notifier.notify(ExecutionEvent::RequestFailed {
          request_id,
          flow: flow.name.clone(),
          error: e.to_string(),
          timestamp_ms: unix_millis(),
        });
      }
    }

    result
  }

  async fn run_inner(
    &self,
    flow: &FlowDefinition,
    request: &RequestContext,
  ) -> Result<Value, PipelineError> {
    let mut state = PipelineState::FetchingSources;
    debug!(state = ?state);
    let sources = self.fetch_sources(flow, request).await?;

    state = PipelineState::Generating;
    debug!(state = ?state);
    let mut input = sources.clone();
    input.insert(
      "request".to_string(),
      serde_json::to_value(request).unwrap_or(Value::Null),
    );
    let output = self
      .generator
      .generate(flow, &Value::Object(input))
      .await
      .map_err(|source| PipelineError::Generation {
        flow: flow.name.clone(),
        request_id: request.request_id.clone(),
        source,
      })?;

    state = PipelineState::ExecutingActions;
    debug!(state = ?state);
    self
      .execute_actions(flow, request, sources, output.clone())
      .await?;

    state = PipelineState::Complete;
    debug!(state = ?state);
    Ok(output)
  }

  /// Fetch every declared source in declaration order. The accumulated map
  /// has exactly one key per distinct property name; the first failure
  /// discards the partial map.
  async fn fetch_sources(
    &self,
    flow: &FlowDefinition,
    request: &RequestContext,
  ) -> Result<Map<String, Value>, PipelineError> {
    let ctx = serde_json::json!({ "request": request });
    let mut sources = Map::new();

    for binding in &flow.sources {
      let config = self
        .resolver
        .render_config(&binding.config, &ctx)
        .map_err(|source| PipelineError::Template {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      let provider = self
        .registry
        .data_source(&binding.provider)
        .map_err(|source| PipelineError::SourceFetch {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      let data = provider
        .fetch_data(request, &config)
        .await
        .map_err(|source| PipelineError::SourceFetch {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      self.notifier.notify(ExecutionEvent::SourceFetched {
        request_id: request.request_id.clone(),
        flow: flow.name.clone(),
        provider: binding.provider.clone(),
        property: binding.property.clone(),
        timestamp_ms: unix_millis(),
      });
      sources.insert(binding.property.clone(), data);
    }

    Ok(sources)
  }

  /// Run every declared result action in declaration order. The scope holds
  /// all sources, the request, and the generated output; a failing action
  /// fails the invocation but earlier side effects stand.
  async fn execute_actions(
    &self,
    flow: &FlowDefinition,
    request: &RequestContext,
    sources: Map<String, Value>,
    output: Value,
  ) -> Result<(), PipelineError> {
    if flow.actions.is_empty() {
      return Ok(());
    }

    let mut scope = sources;
    scope.insert(
      "request".to_string(),
      serde_json::to_value(request).unwrap_or(Value::Null),
    );
    scope.insert("output".to_string(), output);
    let scope = Value::Object(scope);

    for binding in &flow.actions {
      let config = self
        .resolver
        .render_config(&binding.config, &scope)
        .map_err(|source| PipelineError::Template {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      let provider = self
        .registry
        .data_action(&binding.provider)
        .map_err(|source| PipelineError::ActionExecution {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      provider
        .execute(request, &config, &scope)
        .await
        .map_err(|source| PipelineError::ActionExecution {
          provider: binding.provider.clone(),
          property: binding.property.clone(),
          request_id: request.request_id.clone(),
          source,
        })?;

      self.notifier.notify(ExecutionEvent::ActionExecuted {
        request_id: request.request_id.clone(),
        flow: flow.name.clone(),
        provider: binding.provider.clone(),
        property: binding.property.clone(),
        timestamp_ms: unix_millis(),
      });
    }

    Ok(())
  }
}
