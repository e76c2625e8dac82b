//! Built-in filter implementations.
//!
//! This module contains every filter a script can name.

mod blur;
mod color;
mod composite;
pub mod sliding;
mod transform;

use crate::filters::registry::FilterCatalog;

/// Register all built-in filters.
pub fn register_all(catalog: &mut FilterCatalog) {
    blur::register(catalog);
    sliding::register(catalog);
    color::register(catalog);
    transform::register(catalog);
    composite::register(catalog);
}

// Re-export for direct access
pub use blur::BoxBlur;
pub use color::{Brightness, Darkness, Saturation};
pub use composite::Merge;
pub use sliding::{Axis, HorizontalBlur, VerticalBlur};
pub use transform::Resize;
