// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reduction of decoded pixel data to a single luminance plane.

use crate::FusionError;
use ndarray::{Array2, Array3, Axis};

/// Luma weight of the red channel (ITU-R BT.601).
pub const LUMA_RED: f32 = 0.299;
/// Luma weight of the green channel (ITU-R BT.601).
pub const LUMA_GREEN: f32 = 0.587;
/// Luma weight of the blue channel (ITU-R BT.601).
pub const LUMA_BLUE: f32 = 0.114;

/// Pixel data as it comes out of the decoder: either a single grey plane
/// or stacked channel planes with the channel axis last, in R, G, B order.
#[derive(Debug, Clone)]
pub enum PixelArray {
    Gray(Array2<f32>),
    Rgb(Array3<f32>),
}

/// Reduces pixel data to one 2D luminance plane.
///
/// Grey input passes through unchanged. Channel-stacked input is reduced
/// with `Y = 0.299*R + 0.587*G + 0.114*B`; any planes beyond the first
/// three (such as alpha) are ignored.
///
/// # Errors
/// Returns [`FusionError::InvalidChannelCount`] if the channel axis holds
/// fewer than 3 planes.
pub fn as_luminance(image: PixelArray) -> Result<Array2<f32>, FusionError> {
    match image {
        PixelArray::Gray(plane) => Ok(plane),
        PixelArray::Rgb(planes) => {
            let (rows, cols, channels) = planes.dim();
            if channels < 3 {
                return Err(FusionError::InvalidChannelCount(channels));
            }
            let red = planes.index_axis(Axis(2), 0);
            let green = planes.index_axis(Axis(2), 1);
            let blue = planes.index_axis(Axis(2), 2);
            Ok(Array2::from_shape_fn((rows, cols), |(r, c)| {
                LUMA_RED * red[[r, c]] + LUMA_GREEN * green[[r, c]] + LUMA_BLUE * blue[[r, c]]
            }))
        }
    }
}
