//! Size and color reduction ahead of the DCT.
//!
//! Converts to luma first, then resizes with fast_image_resize's SIMD
//! bilinear convolution (AVX2/NEON when available). The convolution widens
//! its kernel when downscaling, so the same picture at different input
//! resolutions lands on nearly the same N×N grid.

use super::matrix::IntensityMatrix;
use crate::error::HashError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::DynamicImage;
use std::path::PathBuf;

/// Reduces any decoded image to an N×N grayscale intensity matrix
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    size: u32,
}

impl ImageNormalizer {
    /// Create a normalizer producing `size`×`size` matrices
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Output size N
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resize to N×N grayscale and read the intensities (0-255).
    ///
    /// Holds no resizer state; each call builds its own `Resizer`.
    pub fn normalize(&self, image: &DynamicImage) -> Result<IntensityMatrix, HashError> {
        let gray = image.to_luma8();

        let src_width = gray.width();
        let src_height = gray.height();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::EmptyImage {
                path: PathBuf::new(),
            });
        }

        if self.size == 0 {
            return Err(HashError::ComputationFailed(
                "Invalid destination dimensions".to_string(),
            ));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| HashError::DecodeError {
                path: PathBuf::new(),
                reason: format!("Failed to create source image: {}", e),
            })?;

        let mut dst_image = Image::new(self.size, self.size, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ));

        Resizer::new()
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| HashError::DecodeError {
                path: PathBuf::new(),
                reason: format!("Resize failed: {}", e),
            })?;

        let n = self.size as usize;
        let values = dst_image
            .into_vec()
            .into_iter()
            .map(f64::from)
            .collect::<Vec<_>>();

        IntensityMatrix::from_vec(n, values).map_err(|e| HashError::ComputationFailed(e.to_string()))
    }
}
