//! The generation collaborator contract.

use async_trait::async_trait;
use promptfile_config::FlowDefinition;
use serde_json::Value;
use thiserror::Error;

/// Failures reported by the generation collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
  /// Template rendering or model invocation failed.
  #[error("generation failed: {message}")]
  Failed { message: String },

  /// The generated output did not satisfy the flow's output schema.
  #[error("output failed schema '{schema}' validation: {message}")]
  SchemaViolation { schema: String, message: String },
}

/// The external generation step: renders the flow's template body against
/// the input, invokes a model, and validates the output against the flow's
/// output-schema reference. Consumed here as a black box - input in,
/// validated output or failure out.
#[async_trait]
pub trait Generator: Send + Sync {
  /// `input` is an object holding every fetched source under its property
  /// name plus the request context under `"request"`.
  async fn generate(&self, flow: &FlowDefinition, input: &Value)
  -> Result<Value, GenerateError>;
}
