//! Filter module.
//!
//! Contains the filter sum type, the catalog that binds script
//! instructions to filters, and the built-in filter implementations.

pub mod builtin;
pub mod filter;
pub mod registry;

pub use filter::Filter;
pub use registry::{BindArgs, Binder, CatalogEntry, FilterCatalog};
