//! Read-only route lookup over a compiled catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use promptfile_config::{ParamValue, RequestContext};
use tracing::debug;

use crate::catalog::Route;
use crate::error::RouteError;
use crate::matcher::RouteSyntax;

/// Serves inbound paths against the compiled route set. Matching tries every
/// bracket-style (and static) template first, then every colon-style
/// template; within each pass the first match in registration order wins.
pub struct RouteManager {
  routes: Vec<Arc<Route>>,
}

impl RouteManager {
  pub fn new(routes: Vec<Arc<Route>>) -> Self {
    Self { routes }
  }

  /// All compiled routes, in registration order.
  pub fn all(&self) -> &[Arc<Route>] {
    &self.routes
  }

  /// Exact template lookup, accepting either surface form.
  pub fn single(&self, template: &str) -> Option<Arc<Route>> {
    self
      .routes
      .iter()
      .find(|route| route.address.bracket == template || route.address.colon == template)
      .cloned()
  }

  /// Match a concrete path, extracting parameters. Mixed-syntax templates
  /// never compile, so every stored route participates.
  pub fn match_path(
    &self,
    path: &str,
  ) -> Option<(Arc<Route>, BTreeMap<String, ParamValue>)> {
    let passes = [
      [RouteSyntax::Bracket, RouteSyntax::Static].as_slice(),
      [RouteSyntax::Colon].as_slice(),
    ];
    for pass in passes {
      for route in &self.routes {
        if !pass.contains(&route.matcher.syntax()) {
          continue;
        }
        if let Some(params) = route.matcher.match_path(path) {
          debug!(path, route = %route.address.bracket, "matched route");
          return Some((route.clone(), params));
        }
      }
    }
    None
  }

  /// Resolve a raw url to its route and a request context with route
  /// extractions merged into `params`.
  pub fn resolve(&self, url: &str) -> Result<(Arc<Route>, RequestContext), RouteError> {
    let request = RequestContext::from_url(url)?;
    self.resolve_request(request)
  }

  /// As [`resolve`](Self::resolve), for an already-built context.
  pub fn resolve_request(
    &self,
    mut request: RequestContext,
  ) -> Result<(Arc<Route>, RequestContext), RouteError> {
    let path = request.path();
    let (route, params) = self
      .match_path(&path)
      .ok_or(RouteError::NotFound { path })?;
    request.merge_params(params);
    Ok((route, request))
  }
}
