//! Default registry assembly and the startup secret-contract check.

use std::collections::BTreeMap;
use std::sync::Arc;

use promptfile_engine::EventNotifier;
use promptfile_providers::{FetchPlugin, FsPlugin, StorePlugin};
use promptfile_registry::{ProviderPlugin, ProviderRegistry};
use promptfile_scheduler::SchedulePlugin;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::BuildError;

/// Build a registry from the user's plugins, then append each built-in
/// (`fetch`, `store`, `fs`, `schedule`) only when no user plugin already
/// claims that name. User plugins keep override priority.
pub fn default_registry(
  user_plugins: Vec<Arc<dyn ProviderPlugin>>,
  config: &ResolvedConfig,
  notifier: Arc<dyn EventNotifier>,
) -> Arc<ProviderRegistry> {
  let registry = Arc::new(ProviderRegistry::new());
  for plugin in user_plugins {
    registry.register_plugin(plugin);
  }

  let builtins: Vec<Arc<dyn ProviderPlugin>> = vec![
    Arc::new(FetchPlugin),
    Arc::new(StorePlugin::new()),
    Arc::new(FsPlugin::new(config.data_dir.clone())),
    Arc::new(SchedulePlugin::new(notifier)),
  ];
  for builtin in builtins {
    if registry.has_plugin(builtin.name()) {
      debug!(name = builtin.name(), "built-in shadowed by user plugin");
    } else {
      registry.register_plugin(builtin);
    }
  }

  registry
}

/// Verify every registered plugin's declared secrets are present.
pub fn validate_secrets(
  registry: &ProviderRegistry,
  secrets: &BTreeMap<String, String>,
) -> Result<(), BuildError> {
  for plugin in registry.plugins() {
    for key in plugin.required_secrets() {
      if !secrets.contains_key(&key) {
        return Err(BuildError::MissingSecret {
          plugin: plugin.name().to_string(),
          key,
        });
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use promptfile_config::RequestContext;
  use promptfile_engine::NoopNotifier;
  use promptfile_registry::{DataSourceProvider, ProviderError};
  use serde_json::{Value, json};

  struct UserFetch;

  #[async_trait]
  impl DataSourceProvider for UserFetch {
    fn name(&self) -> &str {
      "fetch"
    }

    async fn fetch_data(
      &self,
      _request: &RequestContext,
      _config: &Value,
    ) -> Result<Value, ProviderError> {
      Ok(json!("user override"))
    }
  }

  struct UserFetchPlugin;

  impl ProviderPlugin for UserFetchPlugin {
    fn name(&self) -> &str {
      "fetch"
    }

    fn create_data_source(&self) -> Option<Arc<dyn DataSourceProvider>> {
      Some(Arc::new(UserFetch))
    }

    fn required_secrets(&self) -> Vec<String> {
      vec!["NEWS_API_KEY".to_string()]
    }
  }

  #[test]
  fn all_builtins_are_registered_by_default() {
    let registry = default_registry(
      Vec::new(),
      &ResolvedConfig::default(),
      Arc::new(NoopNotifier),
    );
    assert!(registry.data_source("fetch").is_ok());
    assert!(registry.data_source("store").is_ok());
    assert!(registry.data_action("store").is_ok());
    assert!(registry.data_source("fs").is_ok());
    assert!(registry.trigger("schedule").is_ok());
  }

  #[tokio::test]
  async fn user_plugin_shadows_the_builtin_of_the_same_name() {
    let registry = default_registry(
      vec![Arc::new(UserFetchPlugin)],
      &ResolvedConfig::default(),
      Arc::new(NoopNotifier),
    );

    let provider = registry.data_source("fetch").unwrap();
    let data = provider
      .fetch_data(&RequestContext::synthetic(), &json!(null))
      .await
      .unwrap();
    assert_eq!(data, json!("user override"));
  }

  #[test]
  fn missing_declared_secret_fails_validation() {
    let registry = default_registry(
      vec![Arc::new(UserFetchPlugin)],
      &ResolvedConfig::default(),
      Arc::new(NoopNotifier),
    );

    let err = validate_secrets(&registry, &BTreeMap::new()).unwrap_err();
    match err {
      BuildError::MissingSecret { plugin, key } => {
        assert_eq!(plugin, "fetch");
        assert_eq!(key, "NEWS_API_KEY");
      }
      other => panic!("expected MissingSecret, got {other:?}"),
    }

    let mut secrets = BTreeMap::new();
    secrets.insert("NEWS_API_KEY".to_string(), "k".to_string());
    assert!(validate_secrets(&registry, &secrets).is_ok());
  }
}
