//! Promptfile Config
//!
//! Declaration-file model for promptfile. A declaration file is a leading
//! `---` delimited front-matter block followed by an opaque template body.
//! This crate parses the block into the fields the core consumes (`sources`,
//! `result`, `trigger`, an output-schema reference) and passes everything
//! else through untouched, and it defines the per-invocation request context
//! handed to providers and the generation collaborator.

mod declaration;
mod error;
mod flow;
mod request;

pub use declaration::{
  DeclarationFile, ParsedDeclaration, ProviderBinding, TriggerBinding, parse_declaration,
};
pub use error::ParseError;
pub use flow::FlowDefinition;
pub use request::{ParamValue, RequestBody, RequestContext};
