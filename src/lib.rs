// SPDX-License-Identifier: MIT OR Apache-2.0

//! This library contains transform-domain image fusion functions,
//! based on ndarray <https://crates.io/crates/ndarray> and Rayon
//! <https://crates.io/crates/rayon>.
//!
//! Several aligned frames of the same scene are decomposed into a
//! complex-valued multi-resolution representation, their coefficients are
//! merged with a phase-aware policy, and the merged representation is
//! inverted to reconstruct a single fused image. Averaging in the transform
//! domain rather than in pixel space preserves fine detail that plain pixel
//! averaging would wash out when the frames' local structure disagrees.

pub mod image_io;
pub mod luminance;
pub mod merge;
pub mod pipeline;
pub mod transform;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("unknown merge method '{0}', choose from: mean, separate_phase")]
    UnknownMergeMethod(String),
    #[error("unsupported filter set: {0}")]
    UnsupportedFilter(String),
    #[error("level count must be at least 1")]
    InvalidLevelCount,
    #[error("no input images to fuse")]
    NoInputImages,
    #[error("failed to decode {}: {source}", path.display())]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("expected at least 3 channel planes, found {0}")]
    InvalidChannelCount(usize),
    #[error("frame {frame} has {found} high-pass levels, expected {expected} to match frame 0")]
    LevelCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("frame {frame} {subband} has shape {found:?}, expected {expected:?} to match frame 0")]
    ShapeMismatch {
        frame: usize,
        subband: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub mod prelude {
    pub use super::FusionError;
    pub use super::merge::{MergeMethod, merge};
    pub use super::pipeline::{FusionOptions, load_frame, run};
    pub use super::transform::{Decomposition, FilterConfig, FilterSet, forward, inverse};
}
