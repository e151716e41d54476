//! The provider registry: three independent name -> registration namespaces.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ProviderError;
use crate::provider::{
  DataActionProvider, DataSourceProvider, ProviderPlugin, TriggerProvider,
};

/// Holds named providers for the three capability namespaces. Reads dominate
/// after startup; late registration is synchronized behind `RwLock`s so an
/// extensible provider family can add names at runtime.
#[derive(Default)]
pub struct ProviderRegistry {
  plugins: RwLock<Vec<Arc<dyn ProviderPlugin>>>,
  sources: RwLock<HashMap<String, Arc<dyn DataSourceProvider>>>,
  actions: RwLock<HashMap<String, Arc<dyn DataActionProvider>>>,
  triggers: RwLock<HashMap<String, Arc<dyn TriggerProvider>>>,
}

impl ProviderRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register every capability a plugin offers under the plugin's name.
  /// Last write wins: re-registering a name replaces the earlier provider
  /// for all subsequent lookups.
  pub fn register_plugin(&self, plugin: Arc<dyn ProviderPlugin>) {
    if let Some(source) = plugin.create_data_source() {
      self.register_source(source);
    }
    if let Some(action) = plugin.create_data_action() {
      self.register_action(action);
    }
    if let Some(trigger) = plugin.create_trigger_provider() {
      self.register_trigger(trigger);
    }
    self.plugins.write().expect("registry lock poisoned").push(plugin);
  }

  pub fn register_source(&self, provider: Arc<dyn DataSourceProvider>) {
    self
      .sources
      .write()
      .expect("registry lock poisoned")
      .insert(provider.name().to_string(), provider);
  }

  pub fn register_action(&self, provider: Arc<dyn DataActionProvider>) {
    self
      .actions
      .write()
      .expect("registry lock poisoned")
      .insert(provider.name().to_string(), provider);
  }

  pub fn register_trigger(&self, provider: Arc<dyn TriggerProvider>) {
    self
      .triggers
      .write()
      .expect("registry lock poisoned")
      .insert(provider.name().to_string(), provider);
  }

  /// Whether any registered plugin carries this name. Used when appending
  /// built-in defaults so user-supplied plugins keep override priority.
  pub fn has_plugin(&self, name: &str) -> bool {
    self
      .plugins
      .read()
      .expect("registry lock poisoned")
      .iter()
      .any(|plugin| plugin.name() == name)
  }

  /// Every registered plugin, for the secret-contract validation pass.
  pub fn plugins(&self) -> Vec<Arc<dyn ProviderPlugin>> {
    self.plugins.read().expect("registry lock poisoned").clone()
  }

  pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSourceProvider>, ProviderError> {
    let sources = self.sources.read().expect("registry lock poisoned");
    sources
      .get(name)
      .cloned()
      .ok_or_else(|| ProviderError::SourceNotRegistered {
        name: name.to_string(),
        available: joined_names(sources.keys()),
      })
  }

  pub fn data_action(&self, name: &str) -> Result<Arc<dyn DataActionProvider>, ProviderError> {
    let actions = self.actions.read().expect("registry lock poisoned");
    actions
      .get(name)
      .cloned()
      .ok_or_else(|| ProviderError::ActionNotRegistered {
        name: name.to_string(),
        available: joined_names(actions.keys()),
      })
  }

  pub fn trigger(&self, name: &str) -> Result<Arc<dyn TriggerProvider>, ProviderError> {
    let triggers = self.triggers.read().expect("registry lock poisoned");
    triggers
      .get(name)
      .cloned()
      .ok_or_else(|| ProviderError::TriggerNotRegistered {
        name: name.to_string(),
        available: joined_names(triggers.keys()),
      })
  }

  pub fn source_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self
      .sources
      .read()
      .expect("registry lock poisoned")
      .keys()
      .cloned()
      .collect();
    names.sort();
    names
  }

  pub fn action_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self
      .actions
      .read()
      .expect("registry lock poisoned")
      .keys()
      .cloned()
      .collect();
    names.sort();
    names
  }
}

fn joined_names<'a>(keys: impl Iterator<Item = &'a String>) -> String {
  let mut names: Vec<&str> = keys.map(String::as_str).collect();
  names.sort_unstable();
  names.join(", ")
}
