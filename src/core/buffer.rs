//! Pixel storage shared by every filter.
//!
//! A [`PixelBuffer`] is a rectangle of 16-bit RGBA samples addressed with
//! absolute coordinates: a buffer covering `[10, 20) × [0, 5)` is read with
//! `x` in `10..20`, not `0..10`. This lets the dispatcher hand a worker a
//! buffer that covers only its strip while the filter keeps working in the
//! coordinate space of the source image.

use image::{ImageBuffer, Rgba};

/// Largest value a channel can hold.
pub const CHANNEL_MAX: u16 = u16::MAX;

/// A 16-bit-per-channel RGBA pixel.
pub type Pixel = Rgba<u16>;

/// Backing storage of a [`PixelBuffer`].
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// A half-open rectangle `[min_x, max_x) × [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge (inclusive).
    pub min_x: u32,
    /// Top edge (inclusive).
    pub min_y: u32,
    /// Right edge (exclusive).
    pub max_x: u32,
    /// Bottom edge (exclusive).
    pub max_y: u32,
}

impl Region {
    /// Create a region from its edges.
    ///
    /// Inverted edges collapse to an empty region anchored at the minimum.
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    /// Create a region anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Whether the region covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Whether `other` lies entirely inside this region.
    pub fn contains_region(&self, other: &Region) -> bool {
        other.is_empty()
            || (other.min_x >= self.min_x
                && other.max_x <= self.max_x
                && other.min_y >= self.min_y
                && other.max_y <= self.max_y)
    }

    /// Overlap of two regions, possibly empty.
    pub fn intersect(&self, other: &Region) -> Region {
        Region::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }
}

/// A mutable rectangular grid of RGBA16 samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    bounds: Region,
    pixels: Rgba16Image,
}

impl PixelBuffer {
    /// Create a zero-filled (transparent black) buffer covering `bounds`.
    pub fn new(bounds: Region) -> Self {
        Self {
            bounds,
            pixels: ImageBuffer::new(bounds.width(), bounds.height()),
        }
    }

    /// Create a buffer covering `bounds` where every pixel is `pixel`.
    pub fn filled(bounds: Region, pixel: Pixel) -> Self {
        Self {
            bounds,
            pixels: ImageBuffer::from_pixel(bounds.width(), bounds.height(), pixel),
        }
    }

    /// Create a buffer anchored at the origin by evaluating `f` at every pixel.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        Self {
            bounds: Region::from_size(width, height),
            pixels: ImageBuffer::from_fn(width, height, f),
        }
    }

    /// Wrap an existing RGBA16 image, anchored at the origin.
    pub fn from_image(pixels: Rgba16Image) -> Self {
        Self {
            bounds: Region::from_size(pixels.width(), pixels.height()),
            pixels,
        }
    }

    /// Bounds of the buffer.
    pub fn bounds(&self) -> Region {
        self.bounds
    }

    /// Read the pixel at absolute coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside [`bounds`](Self::bounds).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        assert!(
            self.bounds.contains(x, y),
            "pixel ({x}, {y}) read outside of {:?}",
            self.bounds
        );
        *self
            .pixels
            .get_pixel(x - self.bounds.min_x, y - self.bounds.min_y)
    }

    /// Write the pixel at absolute coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside [`bounds`](Self::bounds).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        assert!(
            self.bounds.contains(x, y),
            "pixel ({x}, {y}) written outside of {:?}",
            self.bounds
        );
        self.pixels
            .put_pixel(x - self.bounds.min_x, y - self.bounds.min_y, pixel);
    }

    /// Copy every pixel of `tile` into this buffer at the tile's own coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the tile is not contained in this buffer's bounds.
    pub fn blit(&mut self, tile: &PixelBuffer) {
        let region = tile.bounds();
        assert!(
            self.bounds.contains_region(&region),
            "tile {:?} does not fit in {:?}",
            region,
            self.bounds
        );
        for y in region.min_y..region.max_y {
            for x in region.min_x..region.max_x {
                self.set(x, y, tile.get(x, y));
            }
        }
    }

    /// Borrow the backing image (origin-relative coordinates).
    pub fn as_image(&self) -> &Rgba16Image {
        &self.pixels
    }
}

/// Clamp a widened channel value into `[0, 65535]`.
#[inline]
pub fn clamp_channel(value: i64) -> u16 {
    value.clamp(0, CHANNEL_MAX as i64) as u16
}
