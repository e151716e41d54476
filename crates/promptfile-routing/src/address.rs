//! The dual-form compiled address of one HTTP route.

use crate::error::AddressError;
use crate::matcher::{CompiledRoute, RouteParam, RouteSyntax};

/// One compiled path template in both surface syntaxes, with its ordered
/// parameter descriptors. Frozen once compiled.
#[derive(Debug, Clone)]
pub struct RouteAddress {
  /// Bracket form as derived from the file path, e.g. `/items/[id]`.
  pub bracket: String,
  /// Equivalent colon form, e.g. `/items/:id`.
  pub colon: String,
  pub params: Vec<RouteParam>,
}

impl RouteAddress {
  /// Derive both forms from a bracket-style route path. The colon form
  /// substitutes `:name` for each bracket token, catch-alls included.
  pub fn from_route_path(route_path: &str) -> Result<Self, AddressError> {
    let compiled = CompiledRoute::compile(route_path)?;
    if compiled.syntax() == RouteSyntax::Colon {
      // File-derived paths carry bracket tokens only.
      return Err(AddressError::MixedSyntax {
        path: route_path.to_string(),
      });
    }

    let colon = route_path
      .split('/')
      .map(|segment| {
        if let Some(name) = segment.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
          format!(":{name}")
        } else if let Some(name) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
          format!(":{name}")
        } else {
          segment.to_string()
        }
      })
      .collect::<Vec<_>>()
      .join("/");

    Ok(Self {
      bracket: route_path.to_string(),
      colon,
      params: compiled.params().to_vec(),
    })
  }
}
