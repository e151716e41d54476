//! Promptfile Registry
//!
//! Named provider capabilities and the registry that holds them. A provider
//! plugin bundles up to three capabilities - data source (fetch), data action
//! (execute) and trigger - each registered under the plugin's name in an
//! independent namespace. Lookups are by name at the moment of use; a later
//! registration under an existing name replaces the earlier one for all
//! subsequent lookups.

mod error;
mod flow;
mod provider;
mod registry;

pub use error::ProviderError;
pub use flow::{BoundFlow, BoxError, FlowInvoker};
pub use provider::{
  DataActionProvider, DataSourceProvider, ProviderPlugin, ScheduledTask, TaskState, Trigger,
  TriggerProvider,
};
pub use registry::ProviderRegistry;
