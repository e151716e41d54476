//! The startup catalog build: declaration files in, routes and tasks out.
//!
//! The build is fail-fast: any parse error, unknown provider reference or
//! trigger rejection aborts the whole build. A half-built catalog would
//! silently serve undefined behavior, so none is ever produced.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use promptfile_config::{DeclarationFile, FlowDefinition, parse_declaration};
use serde_json::Value;
use promptfile_engine::{EventNotifier, ExecutionEvent, Pipeline, unix_millis};
use promptfile_registry::{
  BoundFlow, BoxError, FlowInvoker, ProviderRegistry, ScheduledTask,
};
use tracing::{info, instrument};

use crate::address::RouteAddress;
use crate::error::CompileError;
use crate::matcher::CompiledRoute;

/// One compiled HTTP route: the flow, its dual-form address, and its matcher.
#[derive(Debug)]
pub struct Route {
  pub flow: Arc<FlowDefinition>,
  pub address: RouteAddress,
  pub(crate) matcher: CompiledRoute,
}

/// The read-only result of a successful catalog build. A flow lands in
/// exactly one of the two sets: tasks if its trigger map is non-empty,
/// routes otherwise.
pub struct RouteCatalog {
  pub routes: Vec<Arc<Route>>,
  /// Unstarted scheduled tasks keyed by route path.
  pub tasks: HashMap<String, Arc<dyn ScheduledTask>>,
}

impl std::fmt::Debug for RouteCatalog {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RouteCatalog")
      .field("routes", &self.routes.len())
      .field("tasks", &self.tasks.keys())
      .finish()
  }
}

/// Compile every declaration file against the registry. Provider references
/// are validated here so execution-time lookups for already-compiled flows
/// cannot miss.
#[instrument(skip_all, fields(files = files.len()))]
pub fn build_catalog(
  files: Vec<DeclarationFile>,
  registry: &Arc<ProviderRegistry>,
  pipeline: &Arc<Pipeline>,
  notifier: &Arc<dyn EventNotifier>,
) -> Result<RouteCatalog, CompileError> {
  let mut routes = Vec::new();
  let mut tasks: HashMap<String, Arc<dyn ScheduledTask>> = HashMap::new();

  for file in files {
    let parsed = parse_declaration(&file.content).map_err(|source| CompileError::Parse {
      path: file.path.clone(),
      source,
    })?;

    for binding in &parsed.sources {
      registry
        .data_source(&binding.provider)
        .map_err(|source| CompileError::UnknownProvider {
          path: file.path.clone(),
          source,
        })?;
    }
    for binding in &parsed.actions {
      registry
        .data_action(&binding.provider)
        .map_err(|source| CompileError::UnknownProvider {
          path: file.path.clone(),
          source,
        })?;
    }

    let flow = Arc::new(FlowDefinition::from_parsed(&file.route_path, parsed));

    if let Some(binding) = &flow.trigger {
      let provider =
        registry
          .trigger(&binding.provider)
          .map_err(|source| CompileError::UnknownProvider {
            path: file.path.clone(),
            source,
          })?;

      let bound = BoundFlow {
        name: flow.name.clone(),
        route: flow.route_path.clone(),
        invoker: flow_invoker(pipeline.clone(), flow.clone()),
      };
      let task = provider
        .create_trigger()
        .create(bound, &binding.config)
        .map_err(|source| CompileError::Trigger {
          path: file.path.clone(),
          source,
        })?;

      info!(route = %flow.route_path, provider = %binding.provider, "compiled task");
      notifier.notify(ExecutionEvent::TaskCreated {
        route: flow.route_path.clone(),
        provider: binding.provider.clone(),
        timestamp_ms: unix_millis(),
      });
      tasks.insert(flow.route_path.clone(), task);
    } else {
      let address =
        RouteAddress::from_route_path(&flow.route_path).map_err(|source| {
          CompileError::Address {
            path: file.path.clone(),
            source,
          }
        })?;
      let matcher =
        CompiledRoute::compile(&flow.route_path).map_err(|source| CompileError::Address {
          path: file.path.clone(),
          source,
        })?;

      info!(route = %address.bracket, "compiled route");
      routes.push(Arc::new(Route {
        flow,
        address,
        matcher,
      }));
    }
  }

  Ok(RouteCatalog { routes, tasks })
}

/// Erase the pipeline behind a plain async closure so trigger implementations
/// can invoke the flow without depending on the engine.
pub fn flow_invoker(pipeline: Arc<Pipeline>, flow: Arc<FlowDefinition>) -> FlowInvoker {
  Arc::new(move |request| -> BoxFuture<'static, Result<Value, BoxError>> {
    let pipeline = pipeline.clone();
    let flow = flow.clone();
    Box::pin(async move {
      pipeline
        .run(&flow, request)
        .await
        .map_err(|e| Box::new(e) as BoxError)
    })
  })
}
