//! The built-in `fs` provider: file read/write inside a sandbox root.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use promptfile_config::RequestContext;
use promptfile_registry::{
  DataActionProvider, DataSourceProvider, ProviderError, ProviderPlugin,
};
use serde_json::{Value, json};
use tracing::debug;

pub const PROVIDER_NAME: &str = "fs";

/// Resolve a declared path against the sandbox root, lexically. Absolute
/// paths and any traversal leaving the root are errors.
fn resolve(root: &Path, declared: &str) -> Result<PathBuf, ProviderError> {
  let mut resolved = root.to_path_buf();
  for component in Path::new(declared).components() {
    match component {
      Component::Normal(part) => resolved.push(part),
      Component::CurDir => {}
      Component::ParentDir => {
        if !resolved.pop() || !resolved.starts_with(root) {
          return Err(escape_error(declared));
        }
      }
      Component::RootDir | Component::Prefix(_) => return Err(escape_error(declared)),
    }
  }
  if resolved.starts_with(root) {
    Ok(resolved)
  } else {
    Err(escape_error(declared))
  }
}

fn escape_error(declared: &str) -> ProviderError {
  ProviderError::invalid_config(
    PROVIDER_NAME,
    format!("path '{declared}' resolves outside the sandbox root"),
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FsFormat {
  Auto,
  Json,
  Text,
}

fn parse_source_config(config: &Value) -> Result<(String, FsFormat), ProviderError> {
  match config {
    Value::String(path) => Ok((path.clone(), FsFormat::Auto)),
    Value::Object(map) => {
      let path = map
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::invalid_config(PROVIDER_NAME, "missing 'path'"))?;
      let format = match map.get("format").and_then(Value::as_str) {
        None | Some("auto") => FsFormat::Auto,
        Some("json") => FsFormat::Json,
        Some("text") => FsFormat::Text,
        Some(other) => {
          return Err(ProviderError::invalid_config(
            PROVIDER_NAME,
            format!("unknown format '{other}', expected auto, json or text"),
          ));
        }
      };
      Ok((path.to_string(), format))
    }
    _ => Err(ProviderError::invalid_config(
      PROVIDER_NAME,
      "expected a path string or { path, format }",
    )),
  }
}

pub struct FsSource {
  root: PathBuf,
}

#[async_trait]
impl DataSourceProvider for FsSource {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  async fn fetch_data(
    &self,
    _request: &RequestContext,
    config: &Value,
  ) -> Result<Value, ProviderError> {
    let (declared, format) = parse_source_config(config)?;
    let path = resolve(&self.root, &declared)?;
    debug!(path = %path.display(), ?format, "reading");

    let content = tokio::fs::read_to_string(&path)
      .await
      .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;

    let as_json = match format {
      FsFormat::Json => true,
      FsFormat::Text => false,
      FsFormat::Auto => path.extension().and_then(|e| e.to_str()) == Some("json"),
    };

    if as_json {
      serde_json::from_str(&content).map_err(|e| ProviderError::failed(PROVIDER_NAME, e))
    } else {
      Ok(json!({ "content": content }))
    }
  }
}

pub struct FsAction {
  root: PathBuf,
}

#[async_trait]
impl DataActionProvider for FsAction {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  /// Write the scope entry named by `source` (default `"output"`) to `path`.
  /// Strings are written raw, anything else as pretty JSON; `append: true`
  /// appends instead of truncating.
  async fn execute(
    &self,
    _request: &RequestContext,
    config: &Value,
    scope: &Value,
  ) -> Result<(), ProviderError> {
    let declared = config
      .get("path")
      .and_then(Value::as_str)
      .ok_or_else(|| ProviderError::invalid_config(PROVIDER_NAME, "missing 'path'"))?;
    let source = config
      .get("source")
      .and_then(Value::as_str)
      .unwrap_or("output");
    let append = config
      .get("append")
      .and_then(Value::as_bool)
      .unwrap_or(false);

    let value = scope.get(source).cloned().ok_or_else(|| {
      ProviderError::invalid_config(
        PROVIDER_NAME,
        format!("scope has no entry named '{source}'"),
      )
    })?;
    let rendered = match value {
      Value::String(text) => text,
      other => serde_json::to_string_pretty(&other)
        .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?,
    };

    let path = resolve(&self.root, declared)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;
    }

    debug!(path = %path.display(), append, "writing");
    if append {
      let mut existing = tokio::fs::read_to_string(&path).await.unwrap_or_default();
      existing.push_str(&rendered);
      tokio::fs::write(&path, existing)
        .await
        .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;
    } else {
      tokio::fs::write(&path, rendered)
        .await
        .map_err(|e| ProviderError::failed(PROVIDER_NAME, e))?;
    }

    Ok(())
  }
}

/// Plugin offering the `fs` source and action under one sandbox root.
pub struct FsPlugin {
  root: PathBuf,
}

impl FsPlugin {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl ProviderPlugin for FsPlugin {
  fn name(&self) -> &str {
    PROVIDER_NAME
  }

  fn create_data_source(&self) -> Option<Arc<dyn DataSourceProvider>> {
    Some(Arc::new(FsSource {
      root: self.root.clone(),
    }))
  }

  fn create_data_action(&self) -> Option<Arc<dyn DataActionProvider>> {
    Some(Arc::new(FsAction {
      root: self.root.clone(),
    }))
  }
}
