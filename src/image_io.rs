// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image file decode and encode around the fusion core.

use crate::FusionError;
use crate::luminance::PixelArray;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use ndarray::{Array2, Array3};
use std::path::Path;

/// Decodes the image at `path` into raw pixel planes.
///
/// 8-bit grey images decode to a single plane; everything else is decoded
/// to stacked R, G, B planes for the luminance reduction to fold down.
///
/// # Errors
/// Returns [`FusionError::Load`] naming `path` when the file is missing or
/// not a decodable image.
pub fn decode(path: &Path) -> Result<PixelArray, FusionError> {
    let decoded = image::open(path).map_err(|source| FusionError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match decoded {
        DynamicImage::ImageLuma8(gray) => {
            let (width, height) = gray.dimensions();
            PixelArray::Gray(Array2::from_shape_fn(
                (height as usize, width as usize),
                |(r, c)| f32::from(gray.get_pixel(c as u32, r as u32).0[0]),
            ))
        }
        other => {
            let rgb = other.to_rgb8();
            let (width, height) = rgb.dimensions();
            PixelArray::Rgb(Array3::from_shape_fn(
                (height as usize, width as usize, 3),
                |(r, c, channel)| f32::from(rgb.get_pixel(c as u32, r as u32).0[channel]),
            ))
        }
    })
}

/// Clips `image` to [0, 255], quantizes to 8 bits, and writes it to `path`
/// as a PNG.
///
/// The single luminance channel is replicated across R, G and B so the
/// output is always an 8-bit-per-channel colour PNG.
///
/// # Errors
/// Returns [`FusionError::Encode`] naming `path` when the file cannot be
/// written.
pub fn encode(image: &Array2<f32>, path: &Path) -> Result<(), FusionError> {
    let (rows, cols) = image.dim();
    let gray = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([image[[y as usize, x as usize]].clamp(0.0, 255.0) as u8])
    });
    let rgb = DynamicImage::ImageLuma8(gray).into_rgb8();
    rgb.save_with_format(path, ImageFormat::Png)
        .map_err(|source| FusionError::Encode {
            path: path.to_path_buf(),
            source,
        })
}
