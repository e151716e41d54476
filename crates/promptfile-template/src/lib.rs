//! Config template resolution using minijinja.
//!
//! Provider configs may embed template expressions in their string values:
//!
//! ```yaml
//! sources:
//!   fetch:
//!     news: https://api.example.com/news/{{request.params.id}}
//! ```
//!
//! `TemplateResolver` walks a config value tree and renders only the string
//! leaves against a context. Numbers, booleans and nulls pass through
//! unchanged; arrays and objects are walked recursively. This avoids the type
//! coercion bugs of serializing the whole config to text, rendering it, and
//! re-parsing it.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while rendering a config value.
#[derive(Debug, Error)]
pub enum TemplateError {
  /// A string leaf failed to render.
  #[error("failed to render '{template}': {source}")]
  Render {
    template: String,
    #[source]
    source: minijinja::Error,
  },
}

/// Renders string leaves of config values against a context map.
pub struct TemplateResolver {
  env: Environment<'static>,
}

impl TemplateResolver {
  pub fn new() -> Self {
    let mut env = Environment::new();
    // Missing context keys render as empty rather than aborting the
    // invocation; providers validate their own required fields.
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    Self { env }
  }

  /// Render every string leaf of `config` against `ctx`.
  pub fn render_config(&self, config: &Value, ctx: &Value) -> Result<Value, TemplateError> {
    match config {
      Value::String(template) => Ok(Value::String(self.render_str(template, ctx)?)),
      Value::Array(items) => items
        .iter()
        .map(|item| self.render_config(item, ctx))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array),
      Value::Object(map) => map
        .iter()
        .map(|(key, value)| Ok((key.clone(), self.render_config(value, ctx)?)))
        .collect::<Result<serde_json::Map<_, _>, TemplateError>>()
        .map(Value::Object),
      // Non-string leaves pass through unchanged.
      other => Ok(other.clone()),
    }
  }

  fn render_str(&self, template: &str, ctx: &Value) -> Result<String, TemplateError> {
    self
      .env
      .render_str(template, ctx)
      .map_err(|source| TemplateError::Render {
        template: template.to_string(),
        source,
      })
  }
}

impl Default for TemplateResolver {
  fn default() -> Self {
    Self::new()
  }
}
