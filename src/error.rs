use promptfile_engine::PipelineError;
use promptfile_routing::{CompileError, RouteError};
use thiserror::Error;

/// Errors raised while building a [`Promptfile`](crate::Promptfile). Any one
/// of these means no instance is produced.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Compile(#[from] CompileError),

  /// A registered plugin declared a secret the resolved config lacks.
  #[error("plugin '{plugin}' requires secret '{key}' which is not configured")]
  MissingSecret { plugin: String, key: String },
}

/// Errors raised while serving one request. Failure is scoped to the one
/// invocation; the instance keeps serving other routes.
#[derive(Debug, Error)]
pub enum RequestError {
  #[error(transparent)]
  Route(#[from] RouteError),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}
