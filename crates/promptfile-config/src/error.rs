use thiserror::Error;

/// Errors raised while parsing a declaration file's front-matter block.
#[derive(Debug, Error)]
pub enum ParseError {
  /// The front-matter block is not valid YAML.
  #[error("invalid front matter: {source}")]
  InvalidYaml {
    #[source]
    source: serde_yaml::Error,
  },

  /// A front-matter field that must be a mapping is something else.
  #[error("'{field}' must be a mapping")]
  NotAMapping { field: String },

  /// A mapping key is not a string.
  #[error("non-string key in '{field}'")]
  NonStringKey { field: String },

  /// The trigger map names more than one provider.
  #[error("trigger must name exactly one provider, found {count}")]
  MultipleTriggerProviders { count: usize },

  /// A front-matter value could not be converted to JSON.
  #[error("unsupported value in '{field}': {message}")]
  UnsupportedValue { field: String, message: String },
}
