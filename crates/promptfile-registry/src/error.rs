use thiserror::Error;

use crate::flow::BoxError;

/// Errors raised by provider lookups and provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// Data source lookup miss. Enumerates the names currently registered.
  #[error("data source provider '{name}' not registered. available: [{available}]")]
  SourceNotRegistered { name: String, available: String },

  /// Data action lookup miss.
  #[error("data action provider '{name}' not registered. available: [{available}]")]
  ActionNotRegistered { name: String, available: String },

  /// Trigger lookup miss.
  #[error("trigger provider '{name}' not registered. available: [{available}]")]
  TriggerNotRegistered { name: String, available: String },

  /// A provider rejected its rendered config.
  #[error("invalid config for provider '{provider}': {message}")]
  InvalidConfig { provider: String, message: String },

  /// A provider call failed.
  #[error("provider '{provider}' failed: {source}")]
  Failed {
    provider: String,
    #[source]
    source: BoxError,
  },
}

impl ProviderError {
  /// Wrap an arbitrary provider failure.
  pub fn failed(provider: impl Into<String>, source: impl Into<BoxError>) -> Self {
    ProviderError::Failed {
      provider: provider.into(),
      source: source.into(),
    }
  }

  pub fn invalid_config(provider: impl Into<String>, message: impl Into<String>) -> Self {
    ProviderError::InvalidConfig {
      provider: provider.into(),
      message: message.into(),
    }
  }
}
