//! Path-template syntax detection and matching.
//!
//! Templates arrive in one of two parameter syntaxes: bracket style
//! (`/items/[id]`, `/docs/[...slug]`) derived from file paths, and colon
//! style (`/items/:id`) as used by common HTTP routers. A template mixing
//! both is a hard error, never silently resolved.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use promptfile_config::ParamValue;
use regex::Regex;

use crate::error::AddressError;

static COLON_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/:[^/]+").unwrap());
static BRACKET_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/\[(\.\.\.)?[^/\]]+\]").unwrap());

/// Which parameter syntax a path template uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSyntax {
  /// No parameter tokens at all.
  Static,
  /// Only `:name` tokens.
  Colon,
  /// Only `[name]` / `[...name]` tokens.
  Bracket,
  /// Both styles. Never matched.
  Mixed,
}

/// Classify a path template by the parameter tokens it contains.
pub fn detect_syntax(path: &str) -> RouteSyntax {
  let colon = COLON_TOKEN.is_match(path);
  let bracket = BRACKET_TOKEN.is_match(path);
  match (colon, bracket) {
    (true, true) => RouteSyntax::Mixed,
    (true, false) => RouteSyntax::Colon,
    (false, true) => RouteSyntax::Bracket,
    (false, false) => RouteSyntax::Static,
  }
}

/// One parameter descriptor of a compiled template, in segment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParam {
  pub name: String,
  /// Captures all remaining trailing segments as an ordered list.
  pub catch_all: bool,
}

/// A path template compiled to a pattern plus ordered parameter descriptors.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
  template: String,
  syntax: RouteSyntax,
  pattern: Regex,
  params: Vec<RouteParam>,
}

impl CompiledRoute {
  /// Compile a template in either syntax. Mixed templates and catch-alls in
  /// non-final position are rejected.
  pub fn compile(template: &str) -> Result<Self, AddressError> {
    let syntax = detect_syntax(template);
    if syntax == RouteSyntax::Mixed {
      return Err(AddressError::MixedSyntax {
        path: template.to_string(),
      });
    }

    let segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
    let mut pattern = String::from("^");
    let mut params = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
      let last = index == segments.len() - 1;
      pattern.push('/');

      if let Some(name) = segment.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
        if !last {
          return Err(AddressError::CatchAllNotLast {
            path: template.to_string(),
          });
        }
        // One-or-more remaining components; an empty tail is no match.
        pattern.push_str("(.+)");
        params.push(RouteParam {
          name: name.to_string(),
          catch_all: true,
        });
      } else if let Some(name) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        pattern.push_str("([^/]+)");
        params.push(RouteParam {
          name: name.to_string(),
          catch_all: false,
        });
      } else if let Some(name) = segment.strip_prefix(':') {
        pattern.push_str("([^/]+)");
        params.push(RouteParam {
          name: name.to_string(),
          catch_all: false,
        });
      } else {
        pattern.push_str(&regex::escape(segment));
      }
    }

    if segments.is_empty() {
      pattern.push('/');
    }
    pattern.push('$');

    let pattern = Regex::new(&pattern).map_err(|source| AddressError::Pattern {
      path: template.to_string(),
      source,
    })?;

    Ok(Self {
      template: template.to_string(),
      syntax,
      pattern,
      params,
    })
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  pub fn syntax(&self) -> RouteSyntax {
    self.syntax
  }

  pub fn params(&self) -> &[RouteParam] {
    &self.params
  }

  /// Match a concrete path, extracting parameters. Catch-all extractions are
  /// ordered lists of the remaining segments; named extractions are single
  /// values.
  pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, ParamValue>> {
    let captures = self.pattern.captures(path)?;
    let mut extracted = BTreeMap::new();

    for (index, param) in self.params.iter().enumerate() {
      let raw = captures.get(index + 1)?.as_str();
      let value = if param.catch_all {
        ParamValue::Multi(raw.split('/').map(str::to_string).collect())
      } else {
        ParamValue::Single(raw.to_string())
      };
      extracted.insert(param.name.clone(), value);
    }

    Some(extracted)
  }
}
