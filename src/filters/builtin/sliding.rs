//! Sliding-window blurs: HorizontalBlur, VerticalBlur
//!
//! Both average each pixel with its neighbors along one axis, inside the
//! window `[p - strength/2, p + strength/2]` clipped to the image. Instead of
//! summing the window again for every pixel, a running sum is carried along
//! the line: moving one step drops the pixels that left the window and adds
//! the ones that entered it. Near the edges the window shrinks rather than
//! being padded.
//!
//! The running sum travels across a whole row (or column), so splitting a
//! line between workers is not allowed: both filters are non-scalable.

use crate::core::buffer::{clamp_channel, Pixel, PixelBuffer, Region};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use crate::filters::registry::{BindArgs, CatalogEntry, FilterCatalog};
use image::Rgba;

/// Register sliding-window blur filters.
pub fn register(catalog: &mut FilterCatalog) {
    catalog.register(CatalogEntry::new("hblur", "hblur <strength>", bind_hblur));
    catalog.register(CatalogEntry::new("vblur", "vblur <strength>", bind_vblur));
}

fn bind_hblur(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::HorizontalBlur(HorizontalBlur::new(args.positive_int(0, "strength")?)))
}

fn bind_vblur(args: &BindArgs<'_>) -> Result<Filter, BindError> {
    args.expect_arity(1)?;
    Ok(Filter::VerticalBlur(VerticalBlur::new(args.positive_int(0, "strength")?)))
}

/// Direction a sliding window travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Along rows.
    Horizontal,
    /// Along columns.
    Vertical,
}

/// Horizontal sliding-window blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalBlur {
    /// Full window width; the window reaches `strength / 2` pixels each way.
    pub strength: u32,
}

impl HorizontalBlur {
    /// Create a horizontal blur.
    pub fn new(strength: u32) -> Self {
        Self { strength }
    }

    /// Blur the rows of `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        blur_axis(source, destination, region, self.strength, Axis::Horizontal);
    }
}

/// Vertical sliding-window blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalBlur {
    /// Full window height; the window reaches `strength / 2` pixels each way.
    pub strength: u32,
}

impl VerticalBlur {
    /// Create a vertical blur.
    pub fn new(strength: u32) -> Self {
        Self { strength }
    }

    /// Blur the columns of `region`.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        blur_axis(source, destination, region, self.strength, Axis::Vertical);
    }
}

/// Run the sliding window over every line of `region` along `axis`.
pub fn blur_axis(
    source: &PixelBuffer,
    destination: &mut PixelBuffer,
    region: Region,
    strength: u32,
    axis: Axis,
) {
    let bounds = source.bounds();
    let half = strength / 2;

    match axis {
        Axis::Horizontal => {
            for y in region.min_y..region.max_y {
                slide(
                    region.min_x..region.max_x,
                    bounds.min_x..bounds.max_x,
                    half,
                    |x| source.get(x, y),
                    |x, pixel| destination.set(x, y, pixel),
                );
            }
        }
        Axis::Vertical => {
            for x in region.min_x..region.max_x {
                slide(
                    region.min_y..region.max_y,
                    bounds.min_y..bounds.max_y,
                    half,
                    |y| source.get(x, y),
                    |y, pixel| destination.set(x, y, pixel),
                );
            }
        }
    }
}

/// Running per-channel sum over the inclusive window `[lo, hi]`.
struct Window {
    sum: [u64; 4],
    lo: u32,
    hi: u32,
}

impl Window {
    fn add(&mut self, pixel: Pixel) {
        for (acc, channel) in self.sum.iter_mut().zip(pixel.0) {
            *acc += channel as u64;
        }
    }

    fn remove(&mut self, pixel: Pixel) {
        for (acc, channel) in self.sum.iter_mut().zip(pixel.0) {
            *acc -= channel as u64;
        }
    }

    fn average(&self) -> Pixel {
        let count = (self.hi - self.lo + 1) as u64;
        Rgba(self.sum.map(|s| clamp_channel((s / count) as i64)))
    }
}

/// Blur positions `span` of one line whose pixels live in `line`.
///
/// `read` fetches the source pixel at a position on the line and `write`
/// stores the averaged result. Both window edges only ever move forward, so
/// each source pixel enters and leaves the sum once.
fn slide<R, W>(
    span: std::ops::Range<u32>,
    line: std::ops::Range<u32>,
    half: u32,
    read: R,
    mut write: W,
) where
    R: Fn(u32) -> Pixel,
    W: FnMut(u32, Pixel),
{
    if span.is_empty() || line.is_empty() {
        return;
    }

    let lower = |p: u32| p.saturating_sub(half).max(line.start);
    let upper = |p: u32| (p as u64 + half as u64).min(line.end as u64 - 1) as u32;

    let mut window = Window {
        sum: [0; 4],
        lo: lower(span.start),
        hi: upper(span.start),
    };
    for p in window.lo..=window.hi {
        window.add(read(p));
    }

    for p in span {
        let (lo, hi) = (lower(p), upper(p));
        while window.hi < hi {
            window.hi += 1;
            window.add(read(window.hi));
        }
        while window.lo < lo {
            window.remove(read(window.lo));
            window.lo += 1;
        }
        write(p, window.average());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Average of the clamped window around `p`, computed from scratch.
    fn naive_line_average(line: &[Pixel], p: usize, half: usize) -> Pixel {
        let lo = p.saturating_sub(half);
        let hi = (p + half).min(line.len() - 1);
        let count = (hi - lo + 1) as u64;
        let mut sum = [0u64; 4];
        for pixel in &line[lo..=hi] {
            for c in 0..4 {
                sum[c] += pixel[c] as u64;
            }
        }
        Rgba(sum.map(|s| (s / count) as u16))
    }

    fn buffer_from(width: u32, height: u32, pixels: &[[u16; 4]]) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| Rgba(pixels[(y * width + x) as usize]))
    }

    #[test]
    fn test_strength_one_is_identity() {
        let source = PixelBuffer::from_fn(7, 3, |x, y| Rgba([x as u16 * 9000, y as u16, 5, 65535]));
        assert_eq!(Filter::HorizontalBlur(HorizontalBlur::new(1)).apply(&source), source);
        assert_eq!(Filter::VerticalBlur(VerticalBlur::new(1)).apply(&source), source);
    }

    #[test]
    fn test_horizontal_window_shrinks_at_edges() {
        let source = PixelBuffer::from_fn(5, 1, |x, _| Rgba([x as u16 * 100, 0, 0, 0]));
        let out = Filter::HorizontalBlur(HorizontalBlur::new(4)).apply(&source);

        // Window of +-2: [0..=2], [0..=3], [0..=4], [1..=4], [2..=4]
        let reds: Vec<u16> = (0..5).map(|x| out.get(x, 0)[0]).collect();
        assert_eq!(reds, vec![100, 150, 200, 250, 300]);
    }

    #[test]
    fn test_vertical_blur_only_mixes_columns() {
        let source =
            PixelBuffer::from_fn(3, 4, |x, y| Rgba([x as u16 * 1000, y as u16 * 1000, 0, 65535]));
        let out = Filter::VerticalBlur(VerticalBlur::new(2)).apply(&source);

        for y in 0..4 {
            for x in 0..3 {
                assert_eq!(out.get(x, y)[0], x as u16 * 1000);
            }
        }
        // Window of +-1 on column values 0, 1000, 2000, 3000.
        assert_eq!(out.get(1, 0)[1], 500);
        assert_eq!(out.get(1, 1)[1], 1000);
        assert_eq!(out.get(1, 3)[1], 2500);
    }

    #[test]
    fn test_alpha_is_averaged() {
        let source =
            PixelBuffer::from_fn(2, 1, |x, _| Rgba([0, 0, 0, if x == 0 { 0 } else { 65535 }]));
        let out = Filter::HorizontalBlur(HorizontalBlur::new(2)).apply(&source);
        assert_eq!(out.get(0, 0)[3], 32767);
    }

    #[test]
    fn test_saturated_channels_stay_in_range() {
        let source = PixelBuffer::filled(Region::from_size(6, 6), Rgba([65535; 4]));
        let out = Filter::HorizontalBlur(HorizontalBlur::new(5)).apply(&source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_window_wider_than_image() {
        let source = PixelBuffer::from_fn(3, 1, |x, _| Rgba([x as u16 * 300, 0, 0, 0]));
        let out = Filter::HorizontalBlur(HorizontalBlur::new(1000)).apply(&source);
        for x in 0..3 {
            assert_eq!(out.get(x, 0)[0], 300);
        }
    }

    proptest! {
        #[test]
        fn prop_horizontal_matches_naive_average(
            (width, height, pixels) in (1u32..12, 1u32..6).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(any::<[u16; 4]>(), (w * h) as usize))
            }),
            strength in 1u32..30,
        ) {
            let source = buffer_from(width, height, &pixels);
            let out = Filter::HorizontalBlur(HorizontalBlur::new(strength)).apply(&source);

            for y in 0..height {
                let row: Vec<Pixel> = (0..width).map(|x| source.get(x, y)).collect();
                for x in 0..width {
                    let expected = naive_line_average(&row, x as usize, (strength / 2) as usize);
                    prop_assert_eq!(out.get(x, y), expected);
                }
            }
        }

        #[test]
        fn prop_vertical_matches_naive_average(
            (width, height, pixels) in (1u32..6, 1u32..12).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(any::<[u16; 4]>(), (w * h) as usize))
            }),
            strength in 1u32..30,
        ) {
            let source = buffer_from(width, height, &pixels);
            let out = Filter::VerticalBlur(VerticalBlur::new(strength)).apply(&source);

            for x in 0..width {
                let column: Vec<Pixel> = (0..height).map(|y| source.get(x, y)).collect();
                for y in 0..height {
                    let expected = naive_line_average(&column, y as usize, (strength / 2) as usize);
                    prop_assert_eq!(out.get(x, y), expected);
                }
            }
        }
    }
}
