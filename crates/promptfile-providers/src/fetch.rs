//! The built-in `fetch` data source: fetch-by-URL.

use std::sync::Arc;

use async_trait::async_trait;
use promptfile_config::RequestContext;
use promptfile_registry::{DataSourceProvider, ProviderError, ProviderPlugin};
use serde_json::{Value, json};
use tracing::debug;

pub const PROVIDER_NAME: &str = "fetch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchFormat {
  Json,
  Text,
}

/// Normalized form of a fetch config: a bare string is URL shorthand with
/// the JSON format; an object carries `url` and an optional `format`.
fn parse_config(config: &Value) -> Result<(String, FetchFormat), ProviderError> {
  match config {
    Value::String(url) => Ok((url.clone(), FetchFormat::Json)),
    Value::Object(map) => {
      let url = map
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::invalid_config(PROVIDER_NAME, "missing 'url'"))?;
      let format = match map.get("format").and_then(Value::as_str) {
        None | Some("json") => FetchFormat::Json,
        Some("text") => FetchFormat::Text,
        Some(other) => {
          return Err(ProviderError::invalid_config(
            PROVIDER_NAME,
            format!("unknown format '{other}', expected json or text"),
          ));
        }
      };
      Ok((url.to_string(), format))
    }
    _ => Err(ProviderError::invalid_config(
      PROVIDER_NAME,
      "expected a url string or { url, format }",
    )),
  }
}

/// Object-shape the fetched value so templates can always address it by key:
/// text becomes `{content}`, a top-level array becomes `{items}`.
fn shape(value: Value) -> Value {
  match value {
    Value::Array(items) => json!({ "items": items }),
    other => other,
  }
}

pub struct FetchProvider {
  client: reqwest::Client,
}

impl FetchProvider {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
    }
  }
}

impl Default for FetchProvider {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl DataSourceProvider for FetchProvider {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  async fn fetch_data(
    &self,
    _request: &RequestContext,
    config: &Value,
  ) -> Result<Value, ProviderError> {
    let (url, format) = parse_config(config)?;
    debug!(url, ?format, "fetching");

    let response = self
      .client
      .get(&url)
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;

    match format {
      FetchFormat::Json => {
        let value: Value = response
          .json()
          .await
          .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;
        Ok(shape(value))
      }
      FetchFormat::Text => {
        let content = response
          .text()
          .await
          .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;
        Ok(json!({ "content": content }))
      }
    }
  }
}

/// Plugin offering the `fetch` data source.
pub struct FetchPlugin;

impl ProviderPlugin for FetchPlugin {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  fn create_data_source(&self) -> Option<Arc<dyn DataSourceProvider>> {
    Some(Arc::new(FetchProvider::new()))
  }
}
