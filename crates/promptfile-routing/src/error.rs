use std::path::PathBuf;

use promptfile_config::ParseError;
use promptfile_registry::ProviderError;
use thiserror::Error;

/// Errors raised while compiling a route template into a matcher.
#[derive(Debug, Error)]
pub enum AddressError {
  /// The template mixes `:name` and `[name]` tokens.
  #[error("route '{path}' mixes colon and bracket parameter syntax")]
  MixedSyntax { path: String },

  /// A catch-all token appeared before the final segment.
  #[error("route '{path}' has a catch-all segment before the final position")]
  CatchAllNotLast { path: String },

  /// The derived pattern failed to compile.
  #[error("route '{path}' produced an invalid pattern: {source}")]
  Pattern {
    path: String,
    #[source]
    source: regex::Error,
  },
}

/// Errors raised during the startup catalog build. Any one of these aborts
/// the whole build; no partial catalog is ever produced.
#[derive(Debug, Error)]
pub enum CompileError {
  #[error("failed to read '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: ParseError,
  },

  /// A declared provider is not in the registry.
  #[error("unknown provider in '{path}': {source}")]
  UnknownProvider {
    path: PathBuf,
    #[source]
    source: ProviderError,
  },

  #[error("invalid route derived from '{path}': {source}")]
  Address {
    path: PathBuf,
    #[source]
    source: AddressError,
  },

  /// A trigger provider rejected its config while creating the task.
  #[error("failed to create task for '{path}': {source}")]
  Trigger {
    path: PathBuf,
    #[source]
    source: ProviderError,
  },
}

/// Errors raised while resolving an inbound request against the catalog.
#[derive(Debug, Error)]
pub enum RouteError {
  #[error("no route matches path '{path}'")]
  NotFound { path: String },

  #[error("invalid request url: {source}")]
  Url {
    #[from]
    source: url::ParseError,
  },
}
