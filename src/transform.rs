// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forward and inverse complex multi-resolution transform.
//!
//! The forward transform decomposes a 2D luminance image into one real
//! low-pass subband plus N complex high-pass levels, finest level first.
//! Each level stores the residual between the image at that scale and a
//! smoothed, decimated prediction of it; the imaginary part is a quadrature
//! companion of the residual, so every coefficient carries a local phase as
//! well as a magnitude. Reconstruction re-derives the prediction from the
//! coarser scale and adds the residual back, which makes the inverse exact
//! up to floating-point error when called with the same [`FilterConfig`]
//! used for the forward pass.

use crate::FusionError;
use ndarray::Array2;
use num_complex::Complex32;

/// Named smoothing filter banks selectable by configuration.
///
/// The names follow the configuration surface of the fusion tool: a
/// `near_sym` set is used for the first transform stage and a `qshift` set
/// for the remaining stages. Longer filters smooth more aggressively and
/// push more of the image energy into the high-pass levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterSet {
    NearSymA,
    NearSymB,
    QshiftA,
    QshiftB,
    QshiftD,
}

impl FilterSet {
    /// Parses a filter set from a case-insensitive name.
    ///
    /// # Errors
    /// Returns [`FusionError::UnsupportedFilter`] if the name is not one of
    /// `near_sym_a`, `near_sym_b`, `qshift_a`, `qshift_b`, `qshift_d`.
    pub fn from_name(name: &str) -> Result<Self, FusionError> {
        match name.to_lowercase().as_str() {
            "near_sym_a" => Ok(Self::NearSymA),
            "near_sym_b" => Ok(Self::NearSymB),
            "qshift_a" => Ok(Self::QshiftA),
            "qshift_b" => Ok(Self::QshiftB),
            "qshift_d" => Ok(Self::QshiftD),
            _ => Err(FusionError::UnsupportedFilter(name.to_string())),
        }
    }

    /// Returns the configuration name of this filter set.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NearSymA => "near_sym_a",
            Self::NearSymB => "near_sym_b",
            Self::QshiftA => "qshift_a",
            Self::QshiftB => "qshift_b",
            Self::QshiftD => "qshift_d",
        }
    }

    /// Normalized low-pass taps, odd length, summing to exactly 1.0.
    fn taps(&self) -> &'static [f32] {
        match self {
            Self::NearSymA => &[0.25, 0.5, 0.25],
            Self::NearSymB => &[0.0625, 0.25, 0.375, 0.25, 0.0625],
            Self::QshiftA => &[
                0.015_625, 0.093_75, 0.234_375, 0.3125, 0.234_375, 0.093_75, 0.015_625,
            ],
            Self::QshiftB => &[
                0.003_906_25,
                0.031_25,
                0.109_375,
                0.218_75,
                0.273_437_5,
                0.218_75,
                0.109_375,
                0.031_25,
                0.003_906_25,
            ],
            Self::QshiftD => &[0.03125, 0.09375, 0.1875, 0.375, 0.1875, 0.09375, 0.03125],
        }
    }
}

/// The pair of filter sets threaded through one transform run.
///
/// The same value must be used for every forward call and the final inverse
/// call of a pipeline run; mixing configurations yields an incorrect
/// reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Filter set applied at the first (finest) transform stage.
    pub first_stage: FilterSet,
    /// Filter set applied at every later stage.
    pub later_stages: FilterSet,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            first_stage: FilterSet::NearSymB,
            later_stages: FilterSet::QshiftD,
        }
    }
}

impl FilterConfig {
    fn stage_taps(&self, level: usize) -> &'static [f32] {
        if level == 0 {
            self.first_stage.taps()
        } else {
            self.later_stages.taps()
        }
    }
}

/// The complete multi-resolution representation of one image.
///
/// `high_pass_levels()[0]` is the finest scale; higher indices are coarser.
/// The level shapes shrink by a factor of two (rounded up) per level, and
/// the low-pass subband has the shape of one further halving.
#[derive(Debug, Clone)]
pub struct Decomposition {
    low_pass: Array2<f32>,
    high_pass_levels: Vec<Array2<Complex32>>,
}

impl Decomposition {
    /// Assembles a decomposition from its subbands.
    pub fn new(low_pass: Array2<f32>, high_pass_levels: Vec<Array2<Complex32>>) -> Self {
        Self {
            low_pass,
            high_pass_levels,
        }
    }

    /// Returns the real-valued coarse approximation subband.
    pub fn low_pass(&self) -> &Array2<f32> {
        &self.low_pass
    }

    /// Returns the complex detail levels, finest first.
    pub fn high_pass_levels(&self) -> &[Array2<Complex32>] {
        &self.high_pass_levels
    }

    /// Returns the number of high-pass levels.
    pub fn level_count(&self) -> usize {
        self.high_pass_levels.len()
    }
}

/// Decomposes `image` into `level_count` complex high-pass levels plus a
/// real low-pass subband.
///
/// Arbitrary image shapes are supported; decimated shapes round up, so odd
/// dimensions lose no pixels.
///
/// # Errors
/// Returns [`FusionError::InvalidLevelCount`] if `level_count` is zero.
pub fn forward(
    image: &Array2<f32>,
    level_count: usize,
    filters: FilterConfig,
) -> Result<Decomposition, FusionError> {
    if level_count == 0 {
        return Err(FusionError::InvalidLevelCount);
    }

    let mut high_pass_levels = Vec::with_capacity(level_count);
    let mut current = image.clone();
    for level in 0..level_count {
        let taps = filters.stage_taps(level);
        let low = decimate(&smooth(&current, taps));
        let predicted = smooth(&upsample(&low, current.dim()), taps);
        let residual = &current - &predicted;
        let quad = quadrature(&residual);
        let coefficients = Array2::from_shape_fn(residual.dim(), |(r, c)| {
            Complex32::new(residual[[r, c]], quad[[r, c]])
        });
        high_pass_levels.push(coefficients);
        current = low;
    }

    Ok(Decomposition::new(current, high_pass_levels))
}

/// Reconstructs the spatial-domain image from a decomposition.
///
/// Must be called with the same [`FilterConfig`] that produced the
/// decomposition; only the real part of the high-pass coefficients enters
/// the reconstruction.
pub fn inverse(decomposition: &Decomposition, filters: FilterConfig) -> Array2<f32> {
    let mut current = decomposition.low_pass().clone();
    for level in (0..decomposition.level_count()).rev() {
        let coefficients = &decomposition.high_pass_levels()[level];
        let taps = filters.stage_taps(level);
        let predicted = smooth(&upsample(&current, coefficients.dim()), taps);
        current = Array2::from_shape_fn(coefficients.dim(), |(r, c)| {
            predicted[[r, c]] + coefficients[[r, c]].re
        });
    }
    current
}

/// Separable convolution with clamped (edge-replicating) borders.
fn smooth(input: &Array2<f32>, taps: &[f32]) -> Array2<f32> {
    let (rows, cols) = input.dim();
    let half = (taps.len() / 2) as isize;

    let mut horizontal = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, t) in taps.iter().enumerate() {
                let cc = (c as isize + k as isize - half).clamp(0, cols as isize - 1) as usize;
                acc += t * input[[r, cc]];
            }
            horizontal[[r, c]] = acc;
        }
    }

    let mut output = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, t) in taps.iter().enumerate() {
                let rr = (r as isize + k as isize - half).clamp(0, rows as isize - 1) as usize;
                acc += t * horizontal[[rr, c]];
            }
            output[[r, c]] = acc;
        }
    }
    output
}

/// Keep every other sample in both directions; shapes round up.
fn decimate(input: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows.div_ceil(2), cols.div_ceil(2)), |(r, c)| {
        input[[2 * r, 2 * c]]
    })
}

/// Nearest-neighbour expansion back to `target` shape.
fn upsample(input: &Array2<f32>, target: (usize, usize)) -> Array2<f32> {
    Array2::from_shape_fn(target, |(r, c)| input[[r / 2, c / 2]])
}

/// Centred-difference quadrature companion of a residual subband.
fn quadrature(residual: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = residual.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let left = residual[[r, c.saturating_sub(1)]];
        let right = residual[[r, (c + 1).min(cols - 1)]];
        let above = residual[[r.saturating_sub(1), c]];
        let below = residual[[(r + 1).min(rows - 1), c]];
        0.25 * ((right - left) + (below - above))
    })
}
