//! Transform filters: Resize

use crate::core::buffer::{PixelBuffer, Region};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};

/// Register transform filters.
pub fn register(catalog: &mut FilterCatalog) {
    catalog.register(CatalogEntry::new("resize", "resize <width> <height>", bind_resize));
}

fn bind_resize(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(2)?;
    let width = args.positive_int(0, "width")?;
    let height = args.positive_int(1, "height")?;
    Ok(Filter::Resize(Resize::new(width, height)))
}

/// Nearest-neighbor resize.
///
/// The output always covers `[0, width) × [0, height)`; regions handed to
/// [`process`](Self::process) are expressed in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    /// New width in pixels.
    pub width: u32,
    /// New height in pixels.
    pub height: u32,
}

impl Resize {
    /// Create a resize filter.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bounds of the resized image.
    pub fn output_bounds(&self) -> Region {
        Region::from_size(self.width, self.height)
    }

    /// Fill `region` of the resized image by sampling `source`.
    ///
    /// Output pixel `(x, y)` takes input pixel
    /// `(⌊x·inW/outW⌋, ⌊y·inH/outH⌋)` relative to the source origin.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        let input = source.bounds();
        if input.is_empty() {
            return;
        }

        for y in region.min_y..region.max_y {
            let sy = input.min_y + scale(y, input.height(), self.height);
            for x in region.min_x..region.max_x {
                let sx = input.min_x + scale(x, input.width(), self.width);
                destination.set(x, y, source.get(sx, sy));
            }
        }
    }
}

/// `⌊position · from / to⌋` without intermediate overflow.
fn scale(position: u32, from: u32, to: u32) -> u32 {
    (position as u64 * from as u64 / to as u64) as u32
}
