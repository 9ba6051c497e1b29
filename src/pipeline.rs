// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end fusion: load every frame, merge, reconstruct, write.

use crate::merge::{MergeMethod, merge};
use crate::transform::{Decomposition, FilterConfig, forward, inverse};
use crate::{FusionError, image_io, luminance};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Configuration for one fusion run.
///
/// One value is threaded through the whole run so every forward transform
/// and the final inverse are guaranteed to agree on filters and depth.
#[derive(Debug, Clone, Copy)]
pub struct FusionOptions {
    /// Number of transform levels per frame.
    pub level_count: usize,
    /// Filter sets shared by every forward call and the final inverse.
    pub filters: FilterConfig,
    /// Coefficient merge policy.
    pub method: MergeMethod,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            level_count: 4,
            filters: FilterConfig::default(),
            method: MergeMethod::SeparatePhase,
        }
    }
}

/// Decodes the image at `path`, reduces it to luminance and decomposes it.
///
/// # Errors
/// [`FusionError::Load`] when the file cannot be decoded, otherwise any
/// error of the luminance reduction or forward transform.
pub fn load_frame(
    path: &Path,
    level_count: usize,
    filters: FilterConfig,
) -> Result<Decomposition, FusionError> {
    log::info!("loading image from {}", path.display());
    let pixels = image_io::decode(path)?;
    let luma = luminance::as_luminance(pixels)?;
    forward(&luma, level_count, filters)
}

/// Runs the whole fusion pipeline and writes the fused PNG to `output`.
///
/// Configuration is validated before any file is touched. Frames load in
/// parallel; the result does not depend on load order because the merge is
/// order-independent and the collected frames keep their input order for
/// error attribution.
///
/// # Errors
/// Configuration errors ([`FusionError::InvalidLevelCount`],
/// [`FusionError::NoInputImages`]) surface before any I/O; load, merge and
/// encode errors abort the run with the offending path or subband named.
///
/// # Example
/// ```rust,no_run
/// # use libfusion::prelude::*;
/// # use std::path::PathBuf;
/// # fn f() -> Result<(), FusionError> {
/// let inputs = ["a.png", "b.png"].map(PathBuf::from);
/// run(
///     "fused.png".as_ref(),
///     &inputs,
///     &FusionOptions {
///         method: MergeMethod::SeparatePhase,
///         ..FusionOptions::default()
///     },
/// )?;
/// # Ok(())}
/// ```
pub fn run(output: &Path, inputs: &[PathBuf], options: &FusionOptions) -> Result<(), FusionError> {
    if options.level_count == 0 {
        return Err(FusionError::InvalidLevelCount);
    }
    if inputs.is_empty() {
        return Err(FusionError::NoInputImages);
    }

    log::info!("loading {} input frames", inputs.len());
    let frames = inputs
        .par_iter()
        .map(|path| load_frame(path, options.level_count, options.filters))
        .collect::<Result<Vec<_>, FusionError>>()?;

    log::info!("merging using method \"{}\"", options.method.name());
    let merged = merge(&frames, options.method)?;
    let reconstructed = inverse(&merged, options.filters);

    log::info!("saving result to {}", output.display());
    image_io::encode(&reconstructed, output)
}
