//! Resolution and substitution of author-defined custom CSS constructs:
//! custom media queries, custom properties, and custom selectors.
//!
//! Values are collected from heterogeneous sources (inline sets,
//! stylesheets, script modules, structured data) and folded in input
//! order, later sources overriding earlier ones key-by-key. The
//! substitution engines then rewrite raw CSS text against the aggregated
//! set.

pub mod adapters;
pub mod logger;
pub mod source;
pub mod transform;
mod values;

pub use source::{
    Descriptor, Source, SourceError, SourceKind, read_custom, resolve, write_custom,
};
pub use transform::{substitute_media, substitute_properties, substitute_selectors};
pub use values::ValueSet;
