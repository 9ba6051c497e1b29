// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coefficient merging, the heart of the fusion pipeline.
//!
//! A [`MergeMethod`] combines the corresponding subbands of any number of
//! same-shaped decompositions into one. Frame order never affects the
//! result; it is only retained so that errors can name the offending frame.

use crate::FusionError;
use crate::transform::Decomposition;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex32;
use ordered_float::OrderedFloat;

/// Strategy used to combine high-pass coefficients across frames.
///
/// The low-pass subband is always merged with an element-wise arithmetic
/// mean; coarse structure carries no phase, so nothing is lost there. The
/// policies differ only in how the complex detail coefficients combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Element-wise arithmetic mean of the complex coefficients.
    ///
    /// Simple, but when frames' local phases disagree the averaged
    /// magnitude collapses toward zero and fine detail washes out.
    Mean,
    /// Phase consensus with magnitude preservation.
    ///
    /// Per coefficient, the merged phase is the phase of the vector sum
    /// over all frames and the merged magnitude is the strongest magnitude
    /// any single frame exhibits there. Detail survives even when the
    /// frames' phases partly disagree.
    SeparatePhase,
}

impl MergeMethod {
    /// Every registered method name, in the order shown to the user.
    pub const NAMES: &'static [&'static str] = &["mean", "separate_phase"];

    /// Parses a merge method from a case-insensitive configuration name.
    ///
    /// # Errors
    /// Returns [`FusionError::UnknownMergeMethod`] listing the valid names.
    pub fn from_name(name: &str) -> Result<Self, FusionError> {
        match name.to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "separate_phase" => Ok(Self::SeparatePhase),
            _ => Err(FusionError::UnknownMergeMethod(name.to_string())),
        }
    }

    /// Returns the configuration name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::SeparatePhase => "separate_phase",
        }
    }

    /// Merges one set of corresponding subbands, one view per frame.
    ///
    /// All views must share a shape and there must be at least one; both
    /// are guaranteed by [`merge`].
    fn merge_subband(&self, subbands: &[ArrayView2<'_, Complex32>]) -> Array2<Complex32> {
        match self {
            Self::Mean => mean_subband(subbands),
            Self::SeparatePhase => separate_phase_subband(subbands),
        }
    }
}

/// Merges the decompositions of all frames into one.
///
/// Corresponding subbands must match in shape across every frame; the
/// first frame is the reference. Nothing is merged unless every subband
/// validates, so a shape error never leaves a partial result.
///
/// # Errors
/// [`FusionError::NoInputImages`] for an empty frame set,
/// [`FusionError::LevelCountMismatch`] / [`FusionError::ShapeMismatch`]
/// when a frame disagrees with frame 0.
///
/// # Example
/// ```
/// # use libfusion::prelude::*;
/// # use ndarray::Array2;
/// # use num_complex::Complex32;
/// # fn main() -> Result<(), FusionError> {
/// let frame = Decomposition::new(
///     Array2::from_elem((2, 2), 8.0),
///     vec![Array2::from_elem((4, 4), Complex32::new(1.0, -1.0))],
/// );
/// let merged = merge(&[frame.clone(), frame], MergeMethod::Mean)?;
/// assert_eq!(merged.low_pass()[[0, 0]], 8.0);
/// # Ok(())}
/// ```
pub fn merge(frames: &[Decomposition], method: MergeMethod) -> Result<Decomposition, FusionError> {
    let Some(reference) = frames.first() else {
        return Err(FusionError::NoInputImages);
    };
    validate_shapes(frames, reference)?;

    let count = frames.len() as f32;
    let mut low_pass = Array2::<f32>::zeros(reference.low_pass().dim());
    for frame in frames {
        low_pass += frame.low_pass();
    }
    let low_pass = low_pass.mapv(|v| v / count);

    let high_pass_levels = (0..reference.level_count())
        .map(|level| {
            let views: Vec<ArrayView2<'_, Complex32>> = frames
                .iter()
                .map(|frame| frame.high_pass_levels()[level].view())
                .collect();
            method.merge_subband(&views)
        })
        .collect();

    Ok(Decomposition::new(low_pass, high_pass_levels))
}

fn validate_shapes(frames: &[Decomposition], reference: &Decomposition) -> Result<(), FusionError> {
    for (index, frame) in frames.iter().enumerate().skip(1) {
        if frame.level_count() != reference.level_count() {
            return Err(FusionError::LevelCountMismatch {
                frame: index,
                expected: reference.level_count(),
                found: frame.level_count(),
            });
        }
        if frame.low_pass().dim() != reference.low_pass().dim() {
            return Err(FusionError::ShapeMismatch {
                frame: index,
                subband: "low-pass".to_string(),
                expected: reference.low_pass().dim(),
                found: frame.low_pass().dim(),
            });
        }
        for level in 0..reference.level_count() {
            let expected = reference.high_pass_levels()[level].dim();
            let found = frame.high_pass_levels()[level].dim();
            if expected != found {
                return Err(FusionError::ShapeMismatch {
                    frame: index,
                    subband: format!("high-pass level {level}"),
                    expected,
                    found,
                });
            }
        }
    }
    Ok(())
}

fn mean_subband(subbands: &[ArrayView2<'_, Complex32>]) -> Array2<Complex32> {
    let count = subbands.len() as f32;
    Array2::from_shape_fn(subbands[0].dim(), |(r, c)| {
        let mut sum = Complex32::new(0.0, 0.0);
        for subband in subbands {
            sum += subband[[r, c]];
        }
        sum / count
    })
}

fn separate_phase_subband(subbands: &[ArrayView2<'_, Complex32>]) -> Array2<Complex32> {
    Array2::from_shape_fn(subbands[0].dim(), |(r, c)| {
        let mut sum = Complex32::new(0.0, 0.0);
        for subband in subbands {
            sum += subband[[r, c]];
        }
        let detail = subbands
            .iter()
            .map(|subband| OrderedFloat(subband[[r, c]].norm()))
            .max()
            .map(OrderedFloat::into_inner)
            .unwrap_or(0.0);
        let norm = sum.norm();
        if norm == 0.0 {
            // Exact phase cancellation across all frames leaves no phase
            // consensus to scale; the merged coefficient is defined as zero.
            Complex32::new(0.0, 0.0)
        } else {
            (sum / norm) * detail
        }
    })
}
