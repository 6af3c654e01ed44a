//! core
//!
//! Core types and algorithms for persisted configs.
//!
//! # Modules
//!
//! - [`value`] - Config tree types: Node, Primitive, DefaultTree
//! - [`path`] - Dot-path codec and leaf path enumeration
//! - [`navigate`] - Shape-directed get/set by dot path
//! - [`hydrate`] - Building the live tree from a store
//! - [`errors`] - The crate error type
//!
//! # Design Principles
//!
//! - The default tree is the schema: it fixes every path and every kind
//! - Stored values are strings; kinds are recovered from the defaults
//! - Nothing here knows about debouncing or sessions

pub mod errors;
pub mod hydrate;
pub mod navigate;
pub mod path;
pub mod value;

pub use errors::ConfigError;
pub use path::DotPath;
pub use value::{DefaultTree, Kind, Node, Primitive};
