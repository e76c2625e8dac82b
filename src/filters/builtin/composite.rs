//! Composite filters: Merge

use crate::core::buffer::{clamp_channel, PixelBuffer, Region};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};
use image::Rgba;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Register composite filters.
pub fn register(catalog: &mut FilterCatalog) {
    catalog.register(CatalogEntry::new("merge", "merge <input>", bind_merge));
}

fn bind_merge(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    let path = Path::new(args.param(0));
    let overlay = args
        .codec()
        .load(path)
        .map_err(|source| BindError::Overlay {
            filter: args.name().to_string(),
            source,
        })?;
    Ok(Filter::Merge(Merge::new(path, overlay)))
}

/// Additive merge with an overlay image loaded when the instruction is bound.
///
/// Inside the intersection of both images every channel, alpha included, is
/// the clamped sum of base and overlay; outside it the base is kept.
#[derive(Clone, PartialEq)]
pub struct Merge {
    path: PathBuf,
    overlay: Arc<PixelBuffer>,
}

impl Merge {
    /// Create a merge filter from an already decoded overlay.
    pub fn new(path: impl Into<PathBuf>, overlay: PixelBuffer) -> Self {
        Self {
            path: path.into(),
            overlay: Arc::new(overlay),
        }
    }

    /// Where the overlay was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The overlay image.
    pub fn overlay(&self) -> &PixelBuffer {
        &self.overlay
    }

    /// Merge the overlay into `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        for y in region.min_y..region.max_y {
            for x in region.min_x..region.max_x {
                destination.set(x, y, source.get(x, y));
            }
        }

        let overlap = region.intersect(&self.overlay.bounds());
        for y in overlap.min_y..overlap.max_y {
            for x in overlap.min_x..overlap.max_x {
                let base = source.get(x, y);
                let top = self.overlay.get(x, y);
                let mut merged = [0u16; 4];
                for (c, out) in merged.iter_mut().enumerate() {
                    *out = clamp_channel(base[c] as i64 + top[c] as i64);
                }
                destination.set(x, y, Rgba(merged));
            }
        }
    }
}

impl fmt::Debug for Merge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merge")
            .field("path", &self.path)
            .field("overlay_bounds", &self.overlay.bounds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_merge_saturates() {
        let base = PixelBuffer::filled(Region::from_size(5, 5), Rgba([40000; 4]));
        let overlay = PixelBuffer::filled(Region::from_size(5, 5), Rgba([40000; 4]));
        let out = Filter::Merge(Merge::new("overlay.png", overlay)).apply(&base);

        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(out.get(x, y), Rgba([65535; 4]));
            }
        }
    }

    #[test]
    fn test_merge_outside_overlay_keeps_base() {
        let base = PixelBuffer::filled(Region::from_size(6, 4), Rgba([100, 200, 300, 400]));
        let overlay = PixelBuffer::filled(Region::from_size(3, 2), Rgba([1, 2, 3, 4]));
        let out = Filter::Merge(Merge::new("small.png", overlay)).apply(&base);

        assert_eq!(out.get(2, 1), Rgba([101, 202, 303, 404]));
        assert_eq!(out.get(3, 1), Rgba([100, 200, 300, 400]));
        assert_eq!(out.get(0, 2), Rgba([100, 200, 300, 400]));
    }

    #[test]
    fn test_larger_overlay_is_clipped_to_base() {
        let base = PixelBuffer::filled(Region::from_size(2, 2), Rgba([0; 4]));
        let overlay = PixelBuffer::filled(Region::from_size(10, 10), Rgba([7; 4]));
        let out = Filter::Merge(Merge::new("big.png", overlay)).apply(&base);

        assert_eq!(out.bounds(), Region::from_size(2, 2));
        assert_eq!(out.get(1, 1), Rgba([7; 4]));
    }

    #[test]
    fn test_strip_straddling_overlay_edge() {
        let base = PixelBuffer::filled(Region::from_size(8, 2), Rgba([10; 4]));
        let overlay = PixelBuffer::filled(Region::from_size(5, 2), Rgba([1; 4]));
        let merge = Merge::new("left.png", overlay);

        let strip = Region::new(4, 0, 8, 2);
        let mut tile = PixelBuffer::new(strip);
        merge.process(&base, &mut tile, strip);

        for y in 0..2 {
            assert_eq!(tile.get(4, y), Rgba([11; 4]));
            for x in 5..8 {
                assert_eq!(tile.get(x, y), Rgba([10; 4]));
            }
        }
    }

    #[test]
    fn test_strip_outside_overlay_is_copied() {
        let base = PixelBuffer::filled(Region::from_size(6, 3), Rgba([3; 4]));
        let overlay = PixelBuffer::filled(Region::from_size(2, 2), Rgba([9; 4]));
        let merge = Merge::new("tiny.png", overlay);

        let strip = Region::new(3, 0, 6, 3);
        let mut tile = PixelBuffer::new(strip);
        merge.process(&base, &mut tile, strip);

        assert_eq!(tile, PixelBuffer::filled(strip, Rgba([3; 4])));
    }

    #[test]
    fn test_debug_omits_pixels() {
        let merge = Merge::new("o.png", PixelBuffer::new(Region::from_size(2, 2)));
        let debug = format!("{:?}", merge);
        assert!(debug.contains("o.png"));
        assert!(debug.contains("overlay_bounds"));
    }
}
