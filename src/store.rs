//! The assembled instance: scan, compile, serve.

use std::sync::Arc;

use promptfile_config::RequestContext;
use promptfile_engine::{EventNotifier, Generator, NoopNotifier, Pipeline};
use promptfile_registry::{ProviderPlugin, ProviderRegistry};
use promptfile_routing::{RouteManager, build_catalog, scan_prompt_dir};
use promptfile_scheduler::TaskManager;
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::{ConfigLayer, ResolvedConfig, resolve_config};
use crate::defaults::{default_registry, validate_secrets};
use crate::error::{BuildError, RequestError};

/// Builder for a [`Promptfile`]. The generation collaborator is the one
/// mandatory piece; everything else has a default.
pub struct PromptfileBuilder {
  generator: Arc<dyn Generator>,
  layers: Vec<ConfigLayer>,
  plugins: Vec<Arc<dyn ProviderPlugin>>,
  notifier: Arc<dyn EventNotifier>,
}

impl PromptfileBuilder {
  pub fn new(generator: Arc<dyn Generator>) -> Self {
    Self {
      generator,
      layers: Vec::new(),
      plugins: Vec::new(),
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Add a configuration layer. Later layers win per field.
  pub fn config(mut self, layer: ConfigLayer) -> Self {
    self.layers.push(layer);
    self
  }

  /// Add a user provider plugin. User plugins shadow same-named built-ins.
  pub fn plugin(mut self, plugin: Arc<dyn ProviderPlugin>) -> Self {
    self.plugins.push(plugin);
    self
  }

  pub fn notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// Resolve config, assemble the registry, scan and compile the catalog.
  /// Fail-fast: any compile error or missing secret produces no instance.
  #[instrument(skip(self))]
  pub async fn build(self) -> Result<Promptfile, BuildError> {
    let config = resolve_config(&self.layers);
    let registry = default_registry(self.plugins, &config, self.notifier.clone());
    validate_secrets(&registry, &config.secrets)?;

    let files = scan_prompt_dir(&config.prompts_dir).await?;
    let pipeline = Arc::new(Pipeline::new(
      registry.clone(),
      self.generator,
      self.notifier.clone(),
    ));
    let catalog = build_catalog(files, &registry, &pipeline, &self.notifier)?;

    info!(
      routes = catalog.routes.len(),
      tasks = catalog.tasks.len(),
      prompts_dir = %config.prompts_dir.display(),
      "catalog compiled"
    );

    let routes = RouteManager::new(catalog.routes);
    let tasks = TaskManager::new(catalog.tasks, self.notifier.clone());
    if config.start_tasks {
      tasks.start_all();
    }

    Ok(Promptfile {
      config,
      registry,
      pipeline,
      routes,
      tasks,
    })
  }
}

/// A compiled prompt directory: resolves request urls to flows and runs
/// them, and owns the scheduled task set. Read-only once built.
pub struct Promptfile {
  config: ResolvedConfig,
  registry: Arc<ProviderRegistry>,
  pipeline: Arc<Pipeline>,
  routes: RouteManager,
  tasks: TaskManager,
}

impl std::fmt::Debug for Promptfile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Promptfile")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

impl Promptfile {
  pub fn builder(generator: Arc<dyn Generator>) -> PromptfileBuilder {
    PromptfileBuilder::new(generator)
  }

  /// Match `url` against the compiled routes and run the flow's pipeline.
  pub async fn generate(&self, url: &str) -> Result<Value, RequestError> {
    let (route, request) = self.routes.resolve(url)?;
    Ok(self.pipeline.run(&route.flow, request).await?)
  }

  /// As [`generate`](Self::generate), for an already-built request context.
  pub async fn generate_request(&self, request: RequestContext) -> Result<Value, RequestError> {
    let (route, request) = self.routes.resolve_request(request)?;
    Ok(self.pipeline.run(&route.flow, request).await?)
  }

  pub fn routes(&self) -> &RouteManager {
    &self.routes
  }

  pub fn tasks(&self) -> &TaskManager {
    &self.tasks
  }

  pub fn registry(&self) -> &Arc<ProviderRegistry> {
    &self.registry
  }

  pub fn config(&self) -> &ResolvedConfig {
    &self.config
  }

  /// Stop every task and clear the set.
  pub fn cleanup(&self) {
    self.tasks.cleanup();
  }
}
