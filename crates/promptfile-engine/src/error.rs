//! Pipeline error types.

use promptfile_registry::ProviderError;
use promptfile_template::TemplateError;
use thiserror::Error;

use crate::generator::GenerateError;

/// Failures of one invocation. Each variant names the offending provider or
/// flow and carries the invocation's correlation id; a failure terminates
/// only the one invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// Rendering a provider config against the invocation scope failed.
  #[error("config rendering failed for '{provider}.{property}' (request {request_id}): {source}")]
  Template {
    provider: String,
    property: String,
    request_id: String,
    #[source]
    source: TemplateError,
  },

  /// A declared source fetch failed; no partial source map is passed on.
  #[error("source '{provider}.{property}' failed (request {request_id}): {source}")]
  SourceFetch {
    provider: String,
    property: String,
    request_id: String,
    #[source]
    source: ProviderError,
  },

  /// The generation collaborator reported failure before any action ran.
  #[error("generation failed for flow '{flow}' (request {request_id}): {source}")]
  Generation {
    flow: String,
    request_id: String,
    #[source]
    source: GenerateError,
  },

  /// A result action failed. Generation already completed; earlier actions'
  /// side effects are not rolled back.
  #[error("action '{provider}.{property}' failed (request {request_id}): {source}")]
  ActionExecution {
    provider: String,
    property: String,
    request_id: String,
    #[source]
    source: ProviderError,
  },
}
