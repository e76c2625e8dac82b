//! Core types for the Kodama filter pipeline.
//!
//! This module contains the foundations every other module builds on:
//! - Pixel buffers and regions
//! - The image codec seam
//! - Error types

pub mod buffer;
pub mod codec;
pub mod error;

// Re-export commonly used types
pub use buffer::{clamp_channel, Pixel, PixelBuffer, Region, CHANNEL_MAX};
pub use codec::{ImageCodec, StandardCodec};
pub use error::{BindError, KodamaError, ParseError, ParseErrorKind, ResourceError};
