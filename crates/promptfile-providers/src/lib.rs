//! Promptfile Providers
//!
//! The built-in default providers: `fetch` (HTTP fetch-by-URL data source),
//! `store` (in-memory structured store, source and action) and `fs` (file
//! read/write inside a sandbox root). Hosts append these only when no
//! user-supplied plugin already claims the name.

mod fetch;
mod fs;
mod store;

pub use fetch::{FetchPlugin, FetchProvider};
pub use fs::FsPlugin;
pub use store::StorePlugin;
