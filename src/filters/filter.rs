//! The closed set of filters a script can use.
//!
//! Every filter shares one contract: `process(source, destination, region)`
//! reads only from `source` and writes only the pixels of `region` in
//! `destination`. Filters are immutable once bound, so a single instance is
//! shared by every worker of a dispatch.

use crate::core::buffer::{PixelBuffer, Region};
use crate::filters::builtin::{
    BoxBlur, Brightness, Darkness, HorizontalBlur, Merge, Resize, Saturation, VerticalBlur,
};

/// A bound filter instance with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Naive square box blur.
    Blur(BoxBlur),
    /// Sliding-window blur along rows.
    HorizontalBlur(HorizontalBlur),
    /// Sliding-window blur along columns.
    VerticalBlur(VerticalBlur),
    /// Channel offset upwards.
    Brightness(Brightness),
    /// Channel offset downwards.
    Darkness(Darkness),
    /// Distance-to-grey amplification.
    Saturation(Saturation),
    /// Nearest-neighbor resampling.
    Resize(Resize),
    /// Additive merge with an overlay image.
    Merge(Merge),
}

impl Filter {
    /// Script name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Blur(_) => "blur",
            Filter::HorizontalBlur(_) => "hblur",
            Filter::VerticalBlur(_) => "vblur",
            Filter::Brightness(_) => "brightness",
            Filter::Darkness(_) => "darkness",
            Filter::Saturation(_) => "saturation",
            Filter::Resize(_) => "resize",
            Filter::Merge(_) => "merge",
        }
    }

    /// Whether the filter may be split across disjoint regions.
    ///
    /// A scalable filter computes each output pixel from the shared source
    /// alone. The sliding blurs carry state along a line and resize replaces
    /// the whole buffer, so they always run as a single unit.
    pub fn is_scalable(&self) -> bool {
        match self {
            Filter::Blur(_)
            | Filter::Brightness(_)
            | Filter::Darkness(_)
            | Filter::Saturation(_)
            | Filter::Merge(_) => true,
            Filter::HorizontalBlur(_) | Filter::VerticalBlur(_) | Filter::Resize(_) => false,
        }
    }

    /// Bounds of the image produced from an input covering `input`.
    pub fn output_bounds(&self, input: Region) -> Region {
        match self {
            Filter::Resize(resize) => resize.output_bounds(),
            _ => input,
        }
    }

    /// Compute `region` of the output into `destination`.
    ///
    /// `region` is expressed in output coordinates and must lie inside both
    /// [`output_bounds`](Self::output_bounds) and `destination`'s bounds.
    pub fn process(&self, source: &PixelBuffer, destination: &mut PixelBuffer, region: Region) {
        debug_assert!(
            destination.bounds().contains_region(&region),
            "region {:?} outside destination {:?}",
            region,
            destination.bounds()
        );

        match self {
            Filter::Blur(f) => f.process(source, destination, region),
            Filter::HorizontalBlur(f) => f.process(source, destination, region),
            Filter::VerticalBlur(f) => f.process(source, destination, region),
            Filter::Brightness(f) => f.process(source, destination, region),
            Filter::Darkness(f) => f.process(source, destination, region),
            Filter::Saturation(f) => f.process(source, destination, region),
            Filter::Resize(f) => f.process(source, destination, region),
            Filter::Merge(f) => f.process(source, destination, region),
        }
    }

    /// Apply the filter to the whole image on the calling thread.
    pub fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let bounds = self.output_bounds(source.bounds());
        let mut destination = PixelBuffer::new(bounds);
        self.process(source, &mut destination, bounds);
        destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_scalability() {
        assert!(Filter::Blur(BoxBlur::new(2)).is_scalable());
        assert!(Filter::Brightness(Brightness::new(2)).is_scalable());
        assert!(Filter::Darkness(Darkness::new(2)).is_scalable());
        assert!(Filter::Saturation(Saturation::new(2)).is_scalable());
        assert!(!Filter::HorizontalBlur(HorizontalBlur::new(2)).is_scalable());
        assert!(!Filter::VerticalBlur(VerticalBlur::new(2)).is_scalable());
        assert!(!Filter::Resize(Resize::new(2, 2)).is_scalable());
    }

    #[test]
    fn test_names_match_script_tokens() {
        assert_eq!(Filter::HorizontalBlur(HorizontalBlur::new(3)).name(), "hblur");
        assert_eq!(Filter::Resize(Resize::new(1, 1)).name(), "resize");
    }

    #[test]
    fn test_output_bounds() {
        let input = Region::from_size(30, 20);
        assert_eq!(Filter::Blur(BoxBlur::new(1)).output_bounds(input), input);
        assert_eq!(
            Filter::Resize(Resize::new(5, 6)).output_bounds(input),
            Region::from_size(5, 6)
        );
    }

    #[test]
    fn test_apply_covers_whole_image() {
        let source = PixelBuffer::filled(Region::from_size(3, 3), Rgba([0, 0, 0, 1]));
        let out = Filter::Brightness(Brightness::new(100)).apply(&source);
        assert_eq!(
            out,
            PixelBuffer::filled(Region::from_size(3, 3), Rgba([65535, 65535, 65535, 1]))
        );
    }
}
