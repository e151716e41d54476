//! Promptfile
//!
//! Compiles a directory of prompt declaration files into HTTP-routable flows
//! and cron-scheduled tasks. Each `.prompt` file carries a front-matter block
//! declaring data sources to fetch, result actions to run and an optional
//! trigger; the file's location becomes its route. A startup scan compiles
//! the whole catalog against a provider registry (fail-fast on any error),
//! then the instance serves requests by matching a path, fetching declared
//! sources, handing the data to a generation collaborator and running the
//! declared actions.
//!
//! ```no_run
//! use std::sync::Arc;
//! use promptfile::{ConfigLayer, Promptfile};
//! # use promptfile::{FlowDefinition, GenerateError, Generator};
//! # use serde_json::Value;
//! # struct MyGenerator;
//! # #[async_trait::async_trait]
//! # impl Generator for MyGenerator {
//! #   async fn generate(&self, _: &FlowDefinition, _: &Value) -> Result<Value, GenerateError> {
//! #     unimplemented!()
//! #   }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Promptfile::builder(Arc::new(MyGenerator))
//!   .config(ConfigLayer {
//!     prompts_dir: Some("prompts".into()),
//!     ..Default::default()
//!   })
//!   .build()
//!   .await?;
//!
//! let output = store.generate("/items/42").await?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

mod config;
mod defaults;
mod error;
mod store;

pub use config::{ConfigLayer, ResolvedConfig, resolve_config};
pub use defaults::{default_registry, validate_secrets};
pub use error::{BuildError, RequestError};
pub use store::{Promptfile, PromptfileBuilder};

pub use promptfile_config::{
  DeclarationFile, FlowDefinition, ParamValue, ParsedDeclaration, ProviderBinding, RequestBody,
  RequestContext, TriggerBinding, parse_declaration,
};
pub use promptfile_engine::{
  ChannelNotifier, EventNotifier, ExecutionEvent, GenerateError, Generator, NoopNotifier,
  PipelineError,
};
pub use promptfile_providers::{FetchPlugin, FsPlugin, StorePlugin};
pub use promptfile_registry::{
  BoundFlow, DataActionProvider, DataSourceProvider, ProviderError, ProviderPlugin,
  ProviderRegistry, ScheduledTask, TaskState, Trigger, TriggerProvider,
};
pub use promptfile_routing::{CompileError, RouteAddress, RouteError, RouteManager, RouteSyntax};
pub use promptfile_scheduler::{CronTask, SchedulePlugin, TaskManager};
