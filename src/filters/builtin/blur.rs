//! Box blur filter.

use crate::core::buffer::{clamp_channel, PixelBuffer, Region};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};
use image::Rgba;

/// Register blur filters.
pub fn register(catalog: &mut FilterCatalog) {
    catalog.register(CatalogEntry::new("blur", "blur <radius>", bind_blur));
}

fn bind_blur(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::Blur(BoxBlur::new(args.positive_int(0, "radius")?)))
}

/// Naive box blur.
///
/// Each output pixel is the mean of the source pixels in the square of
/// half-width `radius` around it, clipped to the source bounds, so the cost
/// per pixel grows with `radius²`. Alpha is copied from the centre pixel.
/// The window may reach outside the region being written but never outside
/// the source, which is why the filter stays scalable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxBlur {
    /// Half-width of the averaging square.
    pub radius: u32,
}

impl BoxBlur {
    /// Create a box blur.
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Blur `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        let bounds = source.bounds();

        for y in region.min_y..region.max_y {
            let (y0, y1) = clipped_span(y, self.radius, bounds.min_y, bounds.max_y);
            for x in region.min_x..region.max_x {
                let (x0, x1) = clipped_span(x, self.radius, bounds.min_x, bounds.max_x);

                let mut sum = [0u64; 3];
                for sy in y0..=y1 {
                    for sx in x0..=x1 {
                        let pixel = source.get(sx, sy);
                        sum[0] += pixel[0] as u64;
                        sum[1] += pixel[1] as u64;
                        sum[2] += pixel[2] as u64;
                    }
                }

                let count = (x1 - x0 + 1) as u64 * (y1 - y0 + 1) as u64;
                let alpha = source.get(x, y)[3];
                destination.set(
                    x,
                    y,
                    Rgba([
                        clamp_channel((sum[0] / count) as i64),
                        clamp_channel((sum[1] / count) as i64),
                        clamp_channel((sum[2] / count) as i64),
                        alpha,
                    ]),
                );
            }
        }
    }
}

/// Inclusive span `[center - radius, center + radius]` clipped to `[min, max)`.
fn clipped_span(center: u32, radius: u32, min: u32, max: u32) -> (u32, u32) {
    let lo = center.saturating_sub(radius).max(min);
    let hi = (center as u64 + radius as u64).min(max as u64 - 1) as u32;
    (lo, hi)
}
