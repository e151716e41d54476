//! Front-matter parsing for declaration files.

use std::path::PathBuf;

use serde_json::Value;
use serde_yaml::Mapping;

use crate::error::ParseError;

/// A declaration file as read from disk. Immutable once read.
#[derive(Debug, Clone)]
pub struct DeclarationFile {
  /// Absolute path to the file.
  pub path: PathBuf,
  /// Raw file contents.
  pub content: String,
  /// Canonical route path relative to the prompt root, extension stripped,
  /// bracket tokens intact. Always starts with `/`.
  pub route_path: String,
}

/// One `(provider, property, config)` entry from the `sources` or `result`
/// maps, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBinding {
  pub provider: String,
  pub property: String,
  pub config: Value,
}

/// The single trigger entry, when present.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerBinding {
  pub provider: String,
  pub config: Value,
}

/// The parsed form of a declaration file's front matter plus template body.
#[derive(Debug, Clone, Default)]
pub struct ParsedDeclaration {
  /// The opaque template body (everything after the front-matter block).
  pub template: String,
  /// Front-matter fields not consumed by the core, passed through to the
  /// generation collaborator.
  pub metadata: serde_json::Map<String, Value>,
  /// Name of the output schema, resolved by an external schema registry.
  pub output_schema: Option<String>,
  pub sources: Vec<ProviderBinding>,
  pub actions: Vec<ProviderBinding>,
  pub trigger: Option<TriggerBinding>,
}

/// Key under which the core's data block lives in the front matter.
const DATA_KEY: &str = "data.prompt";

/// Split a declaration into its front-matter block and template body, then
/// parse the block. A file without a `---` delimiter is all template.
pub fn parse_declaration(content: &str) -> Result<ParsedDeclaration, ParseError> {
  let mut parts = content.splitn(3, "---");
  let _leading = parts.next();
  let front = match parts.next() {
    Some(front) => front,
    None => {
      return Ok(ParsedDeclaration {
        template: content.to_string(),
        ..Default::default()
      });
    }
  };
  let template = parts.next().unwrap_or("").trim().to_string();

  let yaml: serde_yaml::Value =
    serde_yaml::from_str(front).map_err(|source| ParseError::InvalidYaml { source })?;

  let mapping = match yaml {
    serde_yaml::Value::Mapping(mapping) => mapping,
    // A scalar or empty front-matter block carries no options.
    _ => {
      return Ok(ParsedDeclaration {
        template,
        ..Default::default()
      });
    }
  };

  let mut metadata = serde_json::Map::new();
  let mut sources = Vec::new();
  let mut actions = Vec::new();
  let mut trigger = None;

  for (key, value) in mapping {
    let key = key
      .as_str()
      .ok_or_else(|| ParseError::NonStringKey {
        field: "front matter".to_string(),
      })?
      .to_string();

    if key == DATA_KEY {
      let data = as_mapping(value, DATA_KEY)?;
      for (data_key, data_value) in data {
        let data_key = data_key.as_str().ok_or_else(|| ParseError::NonStringKey {
          field: DATA_KEY.to_string(),
        })?;
        match data_key {
          "sources" => sources = parse_bindings(data_value, "sources")?,
          "result" => actions = parse_bindings(data_value, "result")?,
          "trigger" => trigger = parse_trigger(data_value)?,
          // Unknown data keys are ignored rather than rejected.
          _ => {}
        }
      }
    } else {
      metadata.insert(key, to_json(value, "front matter")?);
    }
  }

  let output_schema = metadata
    .get("output")
    .and_then(|output| output.get("schema"))
    .and_then(|schema| schema.as_str())
    .map(str::to_string);

  Ok(ParsedDeclaration {
    template,
    metadata,
    output_schema,
    sources,
    actions,
    trigger,
  })
}

/// Parse a `provider -> property -> config` map into ordered bindings.
fn parse_bindings(value: serde_yaml::Value, field: &str) -> Result<Vec<ProviderBinding>, ParseError> {
  let providers = as_mapping(value, field)?;
  let mut bindings = Vec::new();

  for (provider, properties) in providers {
    let provider = provider
      .as_str()
      .ok_or_else(|| ParseError::NonStringKey {
        field: field.to_string(),
      })?
      .to_string();
    let properties = as_mapping(properties, &format!("{field}.{provider}"))?;

    for (property, config) in properties {
      let property = property
        .as_str()
        .ok_or_else(|| ParseError::NonStringKey {
          field: format!("{field}.{provider}"),
        })?
        .to_string();
      bindings.push(ProviderBinding {
        provider: provider.clone(),
        property,
        config: to_json(config, field)?,
      });
    }
  }

  Ok(bindings)
}

/// Parse the trigger map, which must name exactly one provider.
fn parse_trigger(value: serde_yaml::Value) -> Result<Option<TriggerBinding>, ParseError> {
  let mapping = as_mapping(value, "trigger")?;
  if mapping.is_empty() {
    return Ok(None);
  }
  if mapping.len() > 1 {
    return Err(ParseError::MultipleTriggerProviders {
      count: mapping.len(),
    });
  }

  let (provider, config) = mapping.into_iter().next().expect("len checked above");
  let provider = provider
    .as_str()
    .ok_or_else(|| ParseError::NonStringKey {
      field: "trigger".to_string(),
    })?
    .to_string();

  Ok(Some(TriggerBinding {
    provider,
    config: to_json(config, "trigger")?,
  }))
}

fn as_mapping(value: serde_yaml::Value, field: &str) -> Result<Mapping, ParseError> {
  match value {
    serde_yaml::Value::Mapping(mapping) => Ok(mapping),
    _ => Err(ParseError::NotAMapping {
      field: field.to_string(),
    }),
  }
}

fn to_json(value: serde_yaml::Value, field: &str) -> Result<Value, ParseError> {
  serde_json::to_value(&value).map_err(|e| ParseError::UnsupportedValue {
    field: field.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const FULL: &str = r#"---
model: example/model-1
output:
  schema: NewsSchema
data.prompt:
  sources:
    fetch:
      news: https://api.example.com/news/{{request.params.id}}
      extra:
        url: https://api.example.com/extra
        format: text
  result:
    store:
      save:
        key: news
  trigger:
    schedule: "*/5 * * * *"
---
Summarize {{news.title}}"#;

  #[test]
  fn parses_sources_in_declaration_order() {
    let parsed = parse_declaration(FULL).unwrap();
    assert_eq!(parsed.sources.len(), 2);
    assert_eq!(parsed.sources[0].provider, "fetch");
    assert_eq!(parsed.sources[0].property, "news");
    assert_eq!(
      parsed.sources[0].config,
      json!("https://api.example.com/news/{{request.params.id}}")
    );
    assert_eq!(parsed.sources[1].property, "extra");
    assert_eq!(parsed.sources[1].config["format"], "text");
  }

  #[test]
  fn parses_result_actions_and_trigger() {
    let parsed = parse_declaration(FULL).unwrap();
    assert_eq!(parsed.actions.len(), 1);
    assert_eq!(parsed.actions[0].provider, "store");
    assert_eq!(parsed.actions[0].property, "save");

    let trigger = parsed.trigger.unwrap();
    assert_eq!(trigger.provider, "schedule");
    assert_eq!(trigger.config, json!("*/5 * * * *"));
  }

  #[test]
  fn passes_unknown_fields_through_as_metadata() {
    let parsed = parse_declaration(FULL).unwrap();
    assert_eq!(parsed.metadata["model"], "example/model-1");
    assert_eq!(parsed.output_schema.as_deref(), Some("NewsSchema"));
    assert_eq!(parsed.template, "Summarize {{news.title}}");
  }

  #[test]
  fn file_without_front_matter_is_all_template() {
    let parsed = parse_declaration("Just a template body").unwrap();
    assert_eq!(parsed.template, "Just a template body");
    assert!(parsed.sources.is_empty());
    assert!(parsed.trigger.is_none());
    assert!(parsed.metadata.is_empty());
  }

  #[test]
  fn trigger_with_two_providers_is_rejected() {
    let content = "---\ndata.prompt:\n  trigger:\n    schedule: \"* * * * *\"\n    other: x\n---\nbody";
    let err = parse_declaration(content).unwrap_err();
    assert!(matches!(
      err,
      ParseError::MultipleTriggerProviders { count: 2 }
    ));
  }

  #[test]
  fn sources_must_be_a_mapping() {
    let content = "---\ndata.prompt:\n  sources: nope\n---\nbody";
    let err = parse_declaration(content).unwrap_err();
    assert!(matches!(err, ParseError::NotAMapping { .. }));
  }

  #[test]
  fn provider_value_must_be_a_property_map() {
    let content = "---\ndata.prompt:\n  sources:\n    fetch: https://example.com\n---\nbody";
    let err = parse_declaration(content).unwrap_err();
    assert!(matches!(err, ParseError::NotAMapping { .. }));
  }
}
