//! Layered host configuration.
//!
//! Hosts assemble any number of partial layers (programmatic defaults, a
//! config file, environment overrides) and fold them into one resolved
//! config. Resolution is a pure left-to-right fold: a later layer's set
//! fields win, its secrets merge key by key.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// One partial configuration layer. Unset fields defer to earlier layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
  /// Root directory scanned for declaration files.
  pub prompts_dir: Option<PathBuf>,
  /// Sandbox root for the built-in `fs` provider.
  pub data_dir: Option<PathBuf>,
  /// Whether compiled tasks start their schedules at build time.
  pub start_tasks: Option<bool>,
  /// Secret values checked against each plugin's declared requirements.
  pub secrets: BTreeMap<String, String>,
}

/// The fully-resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
  pub prompts_dir: PathBuf,
  pub data_dir: PathBuf,
  pub start_tasks: bool,
  pub secrets: BTreeMap<String, String>,
}

impl Default for ResolvedConfig {
  fn default() -> Self {
    Self {
      prompts_dir: PathBuf::from("prompts"),
      data_dir: PathBuf::from("data"),
      start_tasks: true,
      secrets: BTreeMap::new(),
    }
  }
}

/// Fold layers left to right over the defaults.
pub fn resolve_config(layers: &[ConfigLayer]) -> ResolvedConfig {
  let mut resolved = ResolvedConfig::default();
  for layer in layers {
    if let Some(prompts_dir) = &layer.prompts_dir {
      resolved.prompts_dir = prompts_dir.clone();
    }
    if let Some(data_dir) = &layer.data_dir {
      resolved.data_dir = data_dir.clone();
    }
    if let Some(start_tasks) = layer.start_tasks {
      resolved.start_tasks = start_tasks;
    }
    for (key, value) in &layer.secrets {
      resolved.secrets.insert(key.clone(), value.clone());
    }
  }
  resolved
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_layers_yields_the_defaults() {
    let resolved = resolve_config(&[]);
    assert_eq!(resolved.prompts_dir, PathBuf::from("prompts"));
    assert_eq!(resolved.data_dir, PathBuf::from("data"));
    assert!(resolved.start_tasks);
    assert!(resolved.secrets.is_empty());
  }

  #[test]
  fn later_layers_win_per_field() {
    let first = ConfigLayer {
      prompts_dir: Some(PathBuf::from("a")),
      start_tasks: Some(false),
      ..Default::default()
    };
    let second = ConfigLayer {
      prompts_dir: Some(PathBuf::from("b")),
      ..Default::default()
    };

    let resolved = resolve_config(&[first, second]);
    // Overridden by the second layer.
    assert_eq!(resolved.prompts_dir, PathBuf::from("b"));
    // Untouched by the second layer, kept from the first.
    assert!(!resolved.start_tasks);
  }

  #[test]
  fn secrets_merge_key_by_key() {
    let mut first = ConfigLayer::default();
    first.secrets.insert("API_KEY".to_string(), "old".to_string());
    first.secrets.insert("KEPT".to_string(), "yes".to_string());
    let mut second = ConfigLayer::default();
    second.secrets.insert("API_KEY".to_string(), "new".to_string());

    let resolved = resolve_config(&[first, second]);
    assert_eq!(resolved.secrets["API_KEY"], "new");
    assert_eq!(resolved.secrets["KEPT"], "yes");
  }
}
