//! Catalog build tests: scan, compile, partition into routes and tasks.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptfile_config::{DeclarationFile, FlowDefinition, RequestContext};
use promptfile_engine::{GenerateError, Generator, NoopNotifier, Pipeline};
use promptfile_registry::{
  BoundFlow, DataActionProvider, DataSourceProvider, ProviderError, ProviderRegistry,
  ScheduledTask, TaskState, Trigger, TriggerProvider,
};
use promptfile_routing::{CompileError, RouteManager, build_catalog, scan_prompt_dir};
use serde_json::{Value, json};

struct NullSource(&'static str);

#[async_trait]
impl DataSourceProvider for NullSource {
  fn name(&self) -> &str {
    self.0
  }

  async fn fetch_data(
    &self,
    _request: &RequestContext,
    _config: &Value,
  ) -> Result<Value, ProviderError> {
    Ok(json!({"title": "stub"}))
  }
}

struct NullAction(&'static str);

#[async_trait]
impl DataActionProvider for NullAction {
  fn name(&self) -> &str {
    self.0
  }

  async fn execute(
    &self,
    _request: &RequestContext,
    _config: &Value,
    _scope: &Value,
  ) -> Result<(), ProviderError> {
    Ok(())
  }
}

struct NullGenerator;

#[async_trait]
impl Generator for NullGenerator {
  async fn generate(
    &self,
    _flow: &FlowDefinition,
    input: &Value,
  ) -> Result<Value, GenerateError> {
    Ok(json!({"echo": input}))
  }
}

struct StubTask;

impl ScheduledTask for StubTask {
  fn start(&self) {}
  fn stop(&self) {}
  fn state(&self) -> TaskState {
    TaskState::Created
  }
}

/// Records the configs create() is called with; rejects `"bad"`.
struct StubTrigger {
  configs: Arc<Mutex<Vec<Value>>>,
}

impl Trigger for StubTrigger {
  fn create(
    &self,
    _flow: BoundFlow,
    config: &Value,
  ) -> Result<Arc<dyn ScheduledTask>, ProviderError> {
    self.configs.lock().unwrap().push(config.clone());
    if config == &json!("bad") {
      return Err(ProviderError::invalid_config("schedule", "bad expression"));
    }
    Ok(Arc::new(StubTask))
  }
}

struct StubTriggerProvider {
  configs: Arc<Mutex<Vec<Value>>>,
}

impl TriggerProvider for StubTriggerProvider {
  fn name(&self) -> &str {
    "schedule"
  }

  fn create_trigger(&self) -> Arc<dyn Trigger> {
    Arc::new(StubTrigger {
      configs: self.configs.clone(),
    })
  }
}

fn registry_with_stubs() -> (Arc<ProviderRegistry>, Arc<Mutex<Vec<Value>>>) {
  let registry = Arc::new(ProviderRegistry::new());
  registry.register_source(Arc::new(NullSource("fetch")));
  registry.register_action(Arc::new(NullAction("store")));
  let configs = Arc::new(Mutex::new(Vec::new()));
  registry.register_trigger(Arc::new(StubTriggerProvider {
    configs: configs.clone(),
  }));
  (registry, configs)
}

fn pipeline(registry: &Arc<ProviderRegistry>) -> Arc<Pipeline> {
  Arc::new(Pipeline::new(
    registry.clone(),
    Arc::new(NullGenerator),
    Arc::new(NoopNotifier),
  ))
}

fn file(route_path: &str, content: &str) -> DeclarationFile {
  DeclarationFile {
    path: PathBuf::from(format!("/prompts{route_path}.prompt")),
    content: content.to_string(),
    route_path: route_path.to_string(),
  }
}

const ROUTED: &str = r#"---
data.prompt:
  sources:
    fetch:
      news: https://api.example.com/news/{{request.params.id}}
  result:
    store:
      save:
        key: news
---
Summarize {{news.title}}"#;

const SCHEDULED: &str = r#"---
data.prompt:
  trigger:
    schedule: "*/5 * * * *"
---
Tick."#;

#[test]
fn partitions_flows_into_routes_and_tasks() {
  let (registry, configs) = registry_with_stubs();
  let pipeline = pipeline(&registry);
  let notifier: Arc<dyn promptfile_engine::EventNotifier> = Arc::new(NoopNotifier);

  let catalog = build_catalog(
    vec![file("/items/[id]", ROUTED), file("/jobs/digest", SCHEDULED)],
    &registry,
    &pipeline,
    &notifier,
  )
  .unwrap();

  assert_eq!(catalog.routes.len(), 1);
  assert_eq!(catalog.routes[0].address.bracket, "/items/[id]");
  assert_eq!(catalog.routes[0].address.colon, "/items/:id");

  // The trigger-bearing flow became a task, never a route.
  assert_eq!(catalog.tasks.len(), 1);
  let task = &catalog.tasks["/jobs/digest"];
  assert_eq!(task.state(), TaskState::Created);
  assert_eq!(*configs.lock().unwrap(), vec![json!("*/5 * * * *")]);
}

#[test]
fn unknown_source_provider_aborts_the_whole_build() {
  let (registry, _) = registry_with_stubs();
  let pipeline = pipeline(&registry);
  let notifier: Arc<dyn promptfile_engine::EventNotifier> = Arc::new(NoopNotifier);

  let bad = r#"---
data.prompt:
  sources:
    missing:
      news: url
---
body"#;

  let err = build_catalog(
    vec![file("/items/[id]", ROUTED), file("/broken", bad)],
    &registry,
    &pipeline,
    &notifier,
  )
  .unwrap_err();

  match err {
    CompileError::UnknownProvider { path, source } => {
      assert_eq!(path, PathBuf::from("/prompts/broken.prompt"));
      assert!(source.to_string().contains("'missing' not registered"));
    }
    other => panic!("expected UnknownProvider, got {other:?}"),
  }
}

#[test]
fn trigger_config_rejection_aborts_the_build() {
  let (registry, _) = registry_with_stubs();
  let pipeline = pipeline(&registry);
  let notifier: Arc<dyn promptfile_engine::EventNotifier> = Arc::new(NoopNotifier);

  let bad = "---\ndata.prompt:\n  trigger:\n    schedule: bad\n---\nbody";
  let err = build_catalog(
    vec![file("/jobs/broken", bad)],
    &registry,
    &pipeline,
    &notifier,
  )
  .unwrap_err();
  assert!(matches!(err, CompileError::Trigger { .. }));
}

#[tokio::test]
async fn scanned_files_compile_and_resolve_end_to_end() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(dir.path().join("items")).unwrap();
  std::fs::write(dir.path().join("items/[id].prompt"), ROUTED).unwrap();

  let files = scan_prompt_dir(dir.path()).await.unwrap();
  let (registry, _) = registry_with_stubs();
  let pipeline = pipeline(&registry);
  let notifier: Arc<dyn promptfile_engine::EventNotifier> = Arc::new(NoopNotifier);
  let catalog = build_catalog(files, &registry, &pipeline, &notifier).unwrap();

  let manager = RouteManager::new(catalog.routes);
  let (route, request) = manager.resolve("/items/42").unwrap();
  assert_eq!(route.flow.name, "items__id_");

  let output = pipeline.run(&route.flow, request).await.unwrap();
  assert_eq!(output["echo"]["news"]["title"], "stub");
}
