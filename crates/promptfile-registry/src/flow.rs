//! Type-erased handle binding a compiled flow to its execution pipeline.
//!
//! Trigger implementations run flows on a schedule but must not depend on the
//! engine crate, so the catalog builder hands them a `BoundFlow` wrapping the
//! pipeline behind a plain async closure.

use std::sync::Arc;

use futures::future::BoxFuture;
use promptfile_config::RequestContext;
use serde_json::Value;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Runs one invocation of a flow against a request context.
pub type FlowInvoker =
  Arc<dyn Fn(RequestContext) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// A flow bound to its pipeline, ready to be invoked by a trigger.
#[derive(Clone)]
pub struct BoundFlow {
  /// The flow's derived unique name.
  pub name: String,
  /// The bracket-style route path the flow compiled from.
  pub route: String,
  pub invoker: FlowInvoker,
}

impl std::fmt::Debug for BoundFlow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoundFlow")
      .field("name", &self.name)
      .field("route", &self.route)
      .finish_non_exhaustive()
  }
}
