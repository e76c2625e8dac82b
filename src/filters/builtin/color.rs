//! Color adjustment filters: Brightness, Darkness, Saturation
//!
//! All three read only the pixel they write, so they are scalable.
//! Alpha is left untouched.

use crate::core::buffer::{clamp_channel, Pixel, PixelBuffer, Region, CHANNEL_MAX};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};
use image::Rgba;

/// Register color filters.
pub fn register(catalog: &mut FilterCatalog) {
    catalog.register(CatalogEntry::new("brightness", "brightness <strength>", bind_brightness));
    catalog.register(CatalogEntry::new("darkness", "darkness <strength>", bind_darkness));
    catalog.register(CatalogEntry::new("saturation", "saturation <strength>", bind_saturation));
}

fn bind_brightness(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::Brightness(Brightness::new(args.positive_int(0, "strength")?)))
}

fn bind_darkness(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::Darkness(Darkness::new(args.positive_int(0, "strength")?)))
}

fn bind_saturation(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::Saturation(Saturation::new(args.positive_int(0, "strength")?)))
}

/// Offset in channel units for a strength given in percent of full scale.
fn percent_of_full_scale(strength: u32) -> i64 {
    CHANNEL_MAX as i64 * strength as i64 / 100
}

/// Apply `f` to every pixel of `region`, reading from `source`.
fn map_pixels<F>(source: &PixelBuffer, destination: &mut PixelBuffer, region: Region, f: F)
where
    F: Fn(Pixel) -> Pixel,
{
    for y in region.min_y..region.max_y {
        for x in region.min_x..region.max_x {
            destination.set(x, y, f(source.get(x, y)));
        }
    }
}

/// Brightens an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    /// Percentage of full scale added to each channel.
    pub strength: u32,
}

impl Brightness {
    /// Create a brightness filter.
    pub fn new(strength: u32) -> Self {
        Self { strength }
    }

    /// Brighten `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        let offset = percent_of_full_scale(self.strength);
        map_pixels(source, destination, region, |Rgba([r, g, b, a])| {
            Rgba([
                clamp_channel(r as i64 + offset),
                clamp_channel(g as i64 + offset),
                clamp_channel(b as i64 + offset),
                a,
            ])
        });
    }
}

/// Darkens an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Darkness {
    /// Percentage of full scale removed from each channel.
    pub strength: u32,
}

impl Darkness {
    /// Create a darkness filter.
    pub fn new(strength: u32) -> Self {
        Self { strength }
    }

    /// Darken `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        let offset = percent_of_full_scale(self.strength);
        map_pixels(source, destination, region, |Rgba([r, g, b, a])| {
            Rgba([
                clamp_channel(r as i64 - offset),
                clamp_channel(g as i64 - offset),
                clamp_channel(b as i64 - offset),
                a,
            ])
        });
    }
}

/// Saturates an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saturation {
    /// Percentage of each channel's distance to grey that is added to it.
    pub strength: u32,
}

impl Saturation {
    /// Create a saturation filter.
    pub fn new(strength: u32) -> Self {
        Self { strength }
    }

    /// Saturate `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        let strength = self.strength as i64;
        map_pixels(source, destination, region, |Rgba([r, g, b, a])| {
            let (r, g, b) = (r as i64, g as i64, b as i64);
            let grey = (r + g + b) / 3;
            let push = |c: i64| clamp_channel(c + (c - grey).abs() * strength / 100);
            Rgba([push(r), push(g), push(b), a])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(pixel: Pixel) -> PixelBuffer {
        PixelBuffer::filled(Region::from_size(4, 3), pixel)
    }

    fn run(filter: &Filter, source: &PixelBuffer) -> PixelBuffer {
        filter.apply(source)
    }

    #[test]
    fn test_brightness_adds_percentage() {
        let source = solid(Rgba([1000, 0, 30000, 123]));
        let out = run(&Filter::Brightness(Brightness::new(10)), &source);
        assert_eq!(out.get(2, 1), Rgba([1000 + 6553, 6553, 30000 + 6553, 123]));
    }

    #[test]
    fn test_brightness_clamps_at_full_scale() {
        let source = solid(Rgba([65535, 65535, 1, 7]));
        let out = run(&Filter::Brightness(Brightness::new(100)), &source);
        assert_eq!(out.get(0, 0), Rgba([65535, 65535, 65535, 7]));
    }

    #[test]
    fn test_darkness_floors_at_zero() {
        let out = run(&Filter::Darkness(Darkness::new(100)), &solid(Rgba([0, 100, 65535, 9])));
        assert_eq!(out.get(3, 2), Rgba([0, 0, 0, 9]));
    }

    #[test]
    fn test_brightness_then_darkness_is_not_identity() {
        let source = solid(Rgba([60000, 2000, 30000, 65535]));
        let bright = run(&Filter::Brightness(Brightness::new(50)), &source);
        let back = run(&Filter::Darkness(Darkness::new(50)), &bright);

        // 60000 saturated on the way up and lost headroom on the way down.
        assert_eq!(back.get(0, 0), Rgba([65535 - 32767, 2000, 30000, 65535]));
        assert_ne!(back, source);
    }

    #[test]
    fn test_saturation_pushes_away_from_grey() {
        let source = solid(Rgba([30000, 20000, 10000, 5]));
        let out = run(&Filter::Saturation(Saturation::new(50)), &source);
        // grey is 20000: red and blue move 5000 further out, green sits on it
        assert_eq!(out.get(1, 1), Rgba([35000, 20000, 15000, 5]));
    }

    #[test]
    fn test_saturation_leaves_grey_alone() {
        let source = solid(Rgba([4000, 4000, 4000, 1]));
        let out = run(&Filter::Saturation(Saturation::new(300)), &source);
        assert_eq!(out.get(0, 0), Rgba([4000, 4000, 4000, 1]));
    }

    #[test]
    fn test_process_writes_region_only() {
        let source = solid(Rgba([0, 0, 0, 0]));
        let region = Region::new(1, 0, 3, 3);
        let mut destination = PixelBuffer::new(region);
        Brightness::new(100).process(&source, &mut destination, region);

        assert_eq!(destination.bounds(), region);
        assert_eq!(destination.get(1, 0), Rgba([65535, 65535, 65535, 0]));
    }
}
