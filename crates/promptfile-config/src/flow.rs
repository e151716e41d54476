//! The compiled, immutable flow definition.

use serde_json::Value;

use crate::declaration::{ParsedDeclaration, ProviderBinding, TriggerBinding};

/// One compiled declaration file. Built once during the startup scan and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
  /// Unique name derived from the route path.
  pub name: String,
  /// The bracket-style route path the file compiled from.
  pub route_path: String,
  /// Opaque template body, rendered by the generation collaborator.
  pub template: String,
  /// Front-matter fields passed through to the generation collaborator.
  pub metadata: serde_json::Map<String, Value>,
  /// Output-schema name, resolved by an external schema registry.
  pub output_schema: Option<String>,
  /// Data sources fetched before generation, in declaration order.
  pub sources: Vec<ProviderBinding>,
  /// Result actions executed after generation, in declaration order.
  pub actions: Vec<ProviderBinding>,
  /// Trigger spec. A flow with a trigger becomes a scheduled task and never
  /// receives an HTTP address.
  pub trigger: Option<TriggerBinding>,
}

impl FlowDefinition {
  /// Build a flow from a parsed declaration and its route path.
  pub fn from_parsed(route_path: &str, parsed: ParsedDeclaration) -> Self {
    Self {
      name: derive_name(route_path),
      route_path: route_path.to_string(),
      template: parsed.template,
      metadata: parsed.metadata,
      output_schema: parsed.output_schema,
      sources: parsed.sources,
      actions: parsed.actions,
      trigger: parsed.trigger,
    }
  }

  /// Whether this flow is scheduled rather than routed.
  pub fn is_task(&self) -> bool {
    self.trigger.is_some()
  }
}

/// Route path with separators and bracket tokens flattened to underscores.
fn derive_name(route_path: &str) -> String {
  route_path
    .chars()
    .map(|c| match c {
      '/' | '[' | ']' => '_',
      other => other,
    })
    .collect::<String>()
    .trim_start_matches('_')
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn derives_name_from_route_path() {
    assert_eq!(derive_name("/items/[id]"), "items__id_");
    assert_eq!(derive_name("/health"), "health");
  }

  #[test]
  fn flow_with_trigger_is_a_task() {
    let mut parsed = ParsedDeclaration::default();
    parsed.trigger = Some(TriggerBinding {
      provider: "schedule".to_string(),
      config: serde_json::json!("* * * * *"),
    });
    let flow = FlowDefinition::from_parsed("/jobs/daily", parsed);
    assert!(flow.is_task());
    assert_eq!(flow.name, "jobs_daily");
  }
}
