//! Image decoding and encoding.
//!
//! The pipeline only ever sees [`PixelBuffer`]s; turning bytes into pixels
//! and back goes through the [`ImageCodec`] seam so the core stays agnostic
//! of file formats.

use crate::core::buffer::PixelBuffer;
use crate::core::error::ResourceError;
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Format used when the output path does not name a known one.
pub const DEFAULT_FORMAT: ImageFormat = ImageFormat::Jpeg;

/// Converts between encoded images and pixel buffers.
pub trait ImageCodec: Send + Sync {
    /// Decode an encoded image into an RGBA16 buffer anchored at the origin.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, ImageError>;

    /// Encode a buffer in the given format.
    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>, ImageError>;

    /// Read and decode the image at `path`.
    fn load(&self, path: &Path) -> Result<PixelBuffer, ResourceError> {
        let bytes = std::fs::read(path).map_err(|source| ResourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode(&bytes).map_err(|source| ResourceError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Encode `buffer` in the format implied by `path` and write it there.
    fn store(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), ResourceError> {
        let format = format_for_path(path);
        let bytes = self.encode(buffer, format).map_err(|source| ResourceError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, bytes).map_err(|source| ResourceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Pick the output format from a path's extension, falling back to JPEG
/// when the extension is unknown or names a format that cannot be written.
pub fn format_for_path(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| format.writing_enabled())
        .unwrap_or(DEFAULT_FORMAT)
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl StandardCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
        let image = image::load_from_memory(bytes)?;
        Ok(PixelBuffer::from_image(image.to_rgba16()))
    }

    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
        let image = DynamicImage::ImageRgba16(buffer.as_image().clone());

        // Narrow to what each encoder accepts.
        let image = match format {
            ImageFormat::Png | ImageFormat::Tiff => image,
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => DynamicImage::ImageRgba8(image.to_rgba8()),
        };

        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format)?;
        Ok(out.into_inner())
    }
}
