//! Per-invocation request context.
//!
//! A `RequestContext` is created for every inbound request or scheduler tick
//! and discarded once the pipeline completes. The `request_id` is the
//! correlation id linking every event emitted for one invocation.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// A path or query parameter: a single value or an ordered list (catch-all
/// extractions, repeated query keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
  Single(String),
  Multi(Vec<String>),
}

impl From<&str> for ParamValue {
  fn from(value: &str) -> Self {
    ParamValue::Single(value.to_string())
  }
}

impl From<Vec<String>> for ParamValue {
  fn from(values: Vec<String>) -> Self {
    ParamValue::Multi(values)
  }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestBody {
  Json(Value),
  Form(BTreeMap<String, String>),
  Text(String),
}

/// Normalized request context handed to providers and the generation
/// collaborator. Always has a url; scheduler ticks use an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
  #[serde(default)]
  pub method: String,
  pub url: String,
  #[serde(default)]
  pub headers: BTreeMap<String, String>,
  #[serde(default)]
  pub query: BTreeMap<String, ParamValue>,
  #[serde(default)]
  pub params: BTreeMap<String, ParamValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<RequestBody>,
  /// Correlation id for this invocation.
  pub request_id: String,
}

impl RequestContext {
  /// Build a GET context from a url string. Accepts absolute urls and bare
  /// paths (`/items/42?tag=a`).
  pub fn from_url(input: &str) -> Result<Self, url::ParseError> {
    let url = match Url::parse(input) {
      Ok(url) => url,
      Err(url::ParseError::RelativeUrlWithoutBase) => {
        Url::parse("http://localhost")?.join(input)?
      }
      Err(e) => return Err(e),
    };

    let mut query: BTreeMap<String, ParamValue> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
      let value = value.into_owned();
      match query.entry(key.into_owned()) {
        Entry::Occupied(mut entry) => match entry.get_mut() {
          ParamValue::Single(existing) => {
            let first = std::mem::take(existing);
            *entry.get_mut() = ParamValue::Multi(vec![first, value]);
          }
          ParamValue::Multi(values) => values.push(value),
        },
        Entry::Vacant(entry) => {
          entry.insert(ParamValue::Single(value));
        }
      }
    }

    Ok(Self {
      method: "GET".to_string(),
      url: input.to_string(),
      headers: BTreeMap::new(),
      query,
      params: BTreeMap::new(),
      body: None,
      request_id: new_request_id(),
    })
  }

  /// Empty context for a scheduler tick: no real caller, fresh correlation id.
  pub fn synthetic() -> Self {
    Self {
      method: String::new(),
      url: String::new(),
      headers: BTreeMap::new(),
      query: BTreeMap::new(),
      params: BTreeMap::new(),
      body: None,
      request_id: new_request_id(),
    }
  }

  /// The path component of the url (`/items/42` for `http://x/items/42?a=b`).
  pub fn path(&self) -> String {
    match Url::parse(&self.url) {
      Ok(url) => url.path().to_string(),
      // Bare paths: strip the query string.
      Err(_) => self
        .url
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string(),
    }
  }

  /// Merge route-match extractions into `params`. Match extraction wins on
  /// key collision with statically-known values.
  pub fn merge_params(&mut self, extracted: BTreeMap<String, ParamValue>) {
    for (key, value) in extracted {
      self.params.insert(key, value);
    }
  }
}

fn new_request_id() -> String {
  uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_url_parses_bare_paths_and_query() {
    let ctx = RequestContext::from_url("/items/42?tag=a&tag=b&q=x").unwrap();
    assert_eq!(ctx.method, "GET");
    assert_eq!(ctx.path(), "/items/42");
    assert_eq!(
      ctx.query["tag"],
      ParamValue::Multi(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(ctx.query["q"], ParamValue::Single("x".to_string()));
    assert!(!ctx.request_id.is_empty());
  }

  #[test]
  fn from_url_parses_absolute_urls() {
    let ctx = RequestContext::from_url("http://localhost:3000/blog/2025/01").unwrap();
    assert_eq!(ctx.path(), "/blog/2025/01");
  }

  #[test]
  fn match_extraction_wins_param_collisions() {
    let mut ctx = RequestContext::from_url("/items/42").unwrap();
    ctx.params.insert("id".to_string(), "static".into());
    ctx
      .params
      .insert("kept".to_string(), "original".into());

    let mut extracted = BTreeMap::new();
    extracted.insert("id".to_string(), ParamValue::Single("42".to_string()));
    ctx.merge_params(extracted);

    assert_eq!(ctx.params["id"], ParamValue::Single("42".to_string()));
    assert_eq!(ctx.params["kept"], ParamValue::Single("original".to_string()));
  }

  #[test]
  fn synthetic_context_has_a_url_and_fresh_id() {
    let a = RequestContext::synthetic();
    let b = RequestContext::synthetic();
    assert_eq!(a.url, "");
    assert_ne!(a.request_id, b.request_id);
  }

  #[test]
  fn body_serializes_externally_tagged() {
    let body = RequestBody::Json(serde_json::json!({"a": 1}));
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value, serde_json::json!({"json": {"a": 1}}));
  }
}
