//! The built-in `store` provider: an in-memory structured store.
//!
//! The source reads a value by key; the action writes a named scope entry
//! (the generated output by default) under a key. Source and action share
//! one map, so a flow can read back what an earlier invocation wrote.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use promptfile_config::RequestContext;
use promptfile_registry::{
  DataActionProvider, DataSourceProvider, ProviderError, ProviderPlugin,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

pub const PROVIDER_NAME: &str = "store";

type Shared = Arc<RwLock<HashMap<String, Value>>>;

fn parse_key(config: &Value) -> Result<String, ProviderError> {
  match config {
    Value::String(key) => Ok(key.clone()),
    Value::Object(map) => map
      .get("key")
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or_else(|| ProviderError::invalid_config(PROVIDER_NAME, "missing 'key'")),
    _ => Err(ProviderError::invalid_config(
      PROVIDER_NAME,
      "expected a key string or { key }",
    )),
  }
}

pub struct StoreSource {
  data: Shared,
}

#[async_trait]
impl DataSourceProvider for StoreSource {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  /// Read by key. An absent key reads as null rather than failing, so flows
  /// can run before their first write.
  async fn fetch_data(
    &self,
    _request: &RequestContext,
    config: &Value,
  ) -> Result<Value, ProviderError> {
    let key = parse_key(config)?;
    let data = self.data.read().await;
    Ok(data.get(&key).cloned().unwrap_or(Value::Null))
  }
}

pub struct StoreAction {
  data: Shared,
}

#[async_trait]
impl DataActionProvider for StoreAction {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  /// Write the scope entry named by `source` (default `"output"`) under
  /// `key`.
  async fn execute(
    &self,
    _request: &RequestContext,
    config: &Value,
    scope: &Value,
  ) -> Result<(), ProviderError> {
    let key = parse_key(config)?;
    let source = config
      .get("source")
      .and_then(Value::as_str)
      .unwrap_or("output");

    let value = scope.get(source).cloned().ok_or_else(|| {
      ProviderError::invalid_config(
        PROVIDER_NAME,
        format!("scope has no entry named '{source}'"),
      )
    })?;

    debug!(key, source, "storing");
    self.data.write().await.insert(key, value);
    Ok(())
  }
}

/// Plugin offering the `store` source and action over one shared map.
pub struct StorePlugin {
  data: Shared,
}

impl StorePlugin {
  pub fn new() -> Self {
    Self {
      data: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Handle to the backing map, for inspection in tests and host code.
  pub fn data(&self) -> Shared {
    self.data.clone()
  }
}

impl Default for StorePlugin {
  fn default() -> Self {
    Self::new()
  }
}

impl ProviderPlugin for StorePlugin {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  fn create_data_source(&self) -> Option<Arc<dyn DataSourceProvider>> {
    Some(Arc::new(StoreSource {
      data: self.data.clone(),
    }))
  }

  fn create_data_action(&self) -> Option<Arc<dyn DataActionProvider>> {
    Some(Arc::new(StoreAction {
      data: self.data.clone(),
    }))
  }
}
