//! Promptfile Routing
//!
//! The file-to-route compiler and the dual-syntax path matcher. A startup
//! scan collects declaration files, the catalog build validates every
//! provider reference against the registry and partitions flows into HTTP
//! routes and scheduled tasks, and the route manager resolves inbound paths
//! against the compiled set.

mod address;
mod catalog;
mod error;
mod manager;
mod matcher;
mod scanner;

pub use address::RouteAddress;
pub use catalog::{Route, RouteCatalog, build_catalog, flow_invoker};
pub use error::{AddressError, CompileError, RouteError};
pub use manager::RouteManager;
pub use matcher::{CompiledRoute, RouteParam, RouteSyntax, detect_syntax};
pub use scanner::scan_prompt_dir;
