//! Parallel dispatch of one filter over vertical strips.
//!
//! The output is split into full-height strips along the x axis. Every
//! strip is computed into its own tile from the shared, read-only source,
//! then the tiles are copied into the output in strip order. Workers never
//! share a mutable buffer, and the result does not depend on scheduling.

use crate::core::buffer::{PixelBuffer, Region};
use crate::filters::filter::Filter;
use log::{debug, warn};
use rayon::prelude::*;

/// Environment variable overriding the default worker count.
pub const WORKERS_ENV: &str = "KODAMA_WORKERS";

/// Worker count used when the available parallelism is unknown.
pub const FALLBACK_WORKERS: usize = 4;

/// How columns left over by an uneven split are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripPolicy {
    /// Every strip is `width / workers` wide; the rightmost
    /// `width % workers` columns are never computed and stay zero.
    Truncate,
    /// The last strip extends to the right edge.
    #[default]
    Extend,
}

/// Configuration for dispatching a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Number of strips for scalable filters (0 is treated as 1).
    pub workers: usize,
    /// Handling of the split remainder.
    pub strip_policy: StripPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            strip_policy: StripPolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration, with the worker count taken from
    /// [`WORKERS_ENV`] when it holds a positive integer.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(WORKERS_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => config.with_workers(workers),
                _ => {
                    warn!("ignoring {}={:?}, expected a positive integer", WORKERS_ENV, raw);
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the strip policy.
    pub fn with_strip_policy(mut self, policy: StripPolicy) -> Self {
        self.strip_policy = policy;
        self
    }
}

/// Available hardware parallelism, or [`FALLBACK_WORKERS`].
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Split `bounds` into at most `workers` full-height strips.
///
/// The worker count is clamped to `[1, width]`. Strip `i` starts at
/// `min_x + i * (width / workers)`.
pub fn partition(bounds: Region, workers: usize, policy: StripPolicy) -> Vec<Region> {
    let width = bounds.width() as usize;
    if width == 0 {
        return vec![bounds];
    }

    let workers = workers.clamp(1, width);
    let strip = (width / workers) as u32;

    (0..workers as u32)
        .map(|i| {
            let min_x = bounds.min_x + i * strip;
            let max_x = if policy == StripPolicy::Extend && i + 1 == workers as u32 {
                bounds.max_x
            } else {
                min_x + strip
            };
            Region::new(min_x, bounds.min_y, max_x, bounds.max_y)
        })
        .collect()
}

/// Run `filter` over `image` and return the new image.
///
/// Scalable filters are split into `config.workers` strips processed in
/// parallel; the others run as a single strip covering the whole output.
pub fn dispatch(image: &PixelBuffer, filter: &Filter, config: &DispatchConfig) -> PixelBuffer {
    let bounds = filter.output_bounds(image.bounds());
    let workers = if filter.is_scalable() { config.workers } else { 1 };
    let strips = partition(bounds, workers, config.strip_policy);

    let covered: u32 = strips.iter().map(Region::width).sum();
    if covered < bounds.width() {
        warn!(
            "{}: {} rightmost column(s) left unprocessed by a {}-way split",
            filter.name(),
            bounds.width() - covered,
            strips.len()
        );
    }

    let mut output = PixelBuffer::new(bounds);
    if let [strip] = strips.as_slice() {
        debug!("{}: single strip {:?}", filter.name(), strip);
        filter.process(image, &mut output, *strip);
        return output;
    }

    let tiles: Vec<PixelBuffer> = strips
        .par_iter()
        .enumerate()
        .map(|(i, &strip)| {
            debug!("{}: strip {}/{} {:?}", filter.name(), i + 1, strips.len(), strip);
            let mut tile = PixelBuffer::new(strip);
            filter.process(image, &mut tile, strip);
            tile
        })
        .collect();

    for tile in &tiles {
        output.blit(tile);
    }
    output
}
