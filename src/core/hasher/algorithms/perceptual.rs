//! Perceptual Hash (pHash) implementation.
//!
//! pHash works by:
//! 1. Reducing the image to N×N grayscale (32×32 by default)
//! 2. Running a 2D DCT over it
//! 3. Keeping the top-left K×K low-frequency block (8×8 by default)
//! 4. Comparing each kept coefficient with the block mean, DC excluded
//!
//! The result survives scaling, gamma and histogram adjustments and
//! recompression, because only the coarse frequency structure matters.

use super::super::dct::DctTransform;
use super::super::fingerprint::Fingerprint;
use super::super::generator::FingerprintGenerator;
use super::super::matrix::IntensityMatrix;
use super::super::normalize::ImageNormalizer;
use super::super::traits::ImageHasher;
use super::super::HasherConfig;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use tracing::trace;

/// DCT-based perceptual hasher.
///
/// Built from a validated [`HasherConfig`]; holds only read-only state, so a
/// single instance can fingerprint on many threads at once.
#[derive(Debug, Clone)]
pub struct PerceptualHasher {
    config: HasherConfig,
    normalizer: ImageNormalizer,
    transform: DctTransform,
    generator: FingerprintGenerator,
}

impl PerceptualHasher {
    /// Create a hasher, validating the configuration first
    pub fn new(config: HasherConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let size = config.transform_size();
        let normalizer = ImageNormalizer::new(size as u32);
        let transform = DctTransform::new(size);
        let generator = FingerprintGenerator::new(config.retained_block_size(), config.policy());

        Ok(Self {
            config,
            normalizer,
            transform,
            generator,
        })
    }

    /// The configuration this hasher was built with
    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Fingerprint an already-normalized intensity matrix
    pub fn hash_intensities(&self, intensities: &IntensityMatrix) -> Result<Fingerprint, ConfigError> {
        let coefficients = self.transform.transform(intensities)?;
        self.generator.generate(&coefficients)
    }
}

impl ImageHasher for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let intensities = self.normalizer.normalize(image)?;
        let fingerprint = self
            .hash_intensities(&intensities)
            .map_err(|e| HashError::ComputationFailed(e.to_string()))?;

        trace!(bits = fingerprint.len(), "fingerprinted image");
        Ok(fingerprint)
    }

    fn bit_len(&self) -> usize {
        self.generator.bit_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::BitPolicy;
    use image::{ImageBuffer, Rgb};

    /// 8×8 grid of flat blocks with pseudo-random colors
    fn create_block_image(width: u32, height: u32, seed: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let cell = (y * 8 / height) * 8 + (x * 8 / width);
            let mut v = (cell ^ seed.wrapping_mul(0x9E37_79B9)).wrapping_mul(0x85EB_CA6B);
            v ^= v >> 13;
            v = v.wrapping_mul(0xC2B2_AE35);
            v ^= v >> 16;
            Rgb([(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn hasher() -> PerceptualHasher {
        PerceptualHasher::new(HasherConfig::default()).unwrap()
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = hasher();
        let image = create_block_image(128, 128, 1);

        let hash1 = hasher.hash_image(&image).unwrap();
        let hash2 = hasher.hash_image(&image).unwrap();

        assert_eq!(hash1, hash2);
    }

    #[test]
    fn default_config_yields_63_bits() {
        let hasher = hasher();
        let hash = hasher.hash_image(&create_block_image(64, 64, 2)).unwrap();

        assert_eq!(hash.len(), 63);
        assert_eq!(hasher.bit_len(), 63);
    }

    #[test]
    fn literal_policy_yields_49_bits() {
        let hasher = HasherConfig::new()
            .bit_policy(BitPolicy::ExcludeFirstRowAndColumn)
            .build()
            .unwrap();

        let hash = hasher.hash_image(&create_block_image(64, 64, 3)).unwrap();
        assert_eq!(hash.len(), 49);
    }

    #[test]
    fn brightness_shift_keeps_hash_close() {
        let hasher = hasher();
        let image = create_block_image(96, 96, 4);
        let rgb = image.to_rgb8();
        let brighter = DynamicImage::ImageRgb8(ImageBuffer::from_fn(96, 96, |x, y| {
            let p = rgb.get_pixel(x, y).0;
            Rgb([
                p[0].saturating_add(6),
                p[1].saturating_add(6),
                p[2].saturating_add(6),
            ])
        }));

        let distance = hasher
            .hash_image(&image)
            .unwrap()
            .distance(&hasher.hash_image(&brighter).unwrap())
            .unwrap();

        assert!(distance <= 5, "distance was {distance}");
    }

    #[test]
    fn different_images_are_far_apart() {
        let hasher = hasher();
        let a = hasher.hash_image(&create_block_image(64, 64, 5)).unwrap();
        let b = hasher.hash_image(&create_block_image(64, 64, 99)).unwrap();

        assert!(a.distance(&b).unwrap() > 10);
    }

    #[test]
    fn intensities_of_wrong_size_are_rejected() {
        let matrix = IntensityMatrix::from_fn(16, |_, _| 0.0);
        assert!(matches!(
            hasher().hash_intensities(&matrix),
            Err(ConfigError::MatrixSizeMismatch { .. })
        ));
    }
}
