//! # Kodama - Scripted Image Filters
//!
//! Kodama reads a small line-oriented script describing image processing
//! steps and runs it. Each step loads an input image, applies a sequence of
//! filters and writes the result:
//!
//! ```text
//! with photo.jpg as small.jpg
//! resize 640 480
//! saturation 20
//! done
//!
//! with small.jpg as soft.png
//! hblur 9
//! vblur 9
//! done
//! ```
//!
//! Images are processed as 16-bit RGBA. Filters that compute every pixel
//! from the source alone are split into vertical strips and run in
//! parallel; the others run on a single worker.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kodama::prelude::*;
//!
//! let catalog = FilterCatalog::with_builtins();
//! let script = Script::parse_str("with in.png as out.png\nblur 2\ndone\n", &catalog).unwrap();
//!
//! let runner = ScriptRunner::new();
//! let report = runner.run(&script, None).unwrap();
//! assert!(report.is_success());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Pixel buffers, regions, the image codec and error types
//! - [`filters`]: The filter set and the catalog binding script lines to filters
//! - [`script`]: Script model and parser
//! - [`execution`]: Strip dispatch, the script runner and progress reporting

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod filters;
pub mod script;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use crate::core::buffer::{Pixel, PixelBuffer, Region, CHANNEL_MAX};
    pub use crate::core::codec::{ImageCodec, StandardCodec};

    // Errors
    pub use crate::core::error::{
        BindError, KodamaError, ParseError, ParseErrorKind, ResourceError,
    };

    // Script
    pub use crate::script::{Instruction, ParseContext, Script, Step};

    // Execution
    pub use crate::execution::dispatch::{dispatch, DispatchConfig, StripPolicy};
    pub use crate::execution::engine::{
        ExecutionOptions, ExecutionReport, ExecutionStats, ScriptRunner,
    };
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};

    // Filters
    pub use crate::filters::filter::Filter;
    pub use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};

    // Built-in filters
    pub use crate::filters::builtin::{
        // Blur
        BoxBlur, HorizontalBlur, VerticalBlur,
        // Color
        Brightness, Darkness, Saturation,
        // Transform
        Resize,
        // Composite
        Merge,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
