//! Trait definitions for image fingerprinting.

use super::fast_decode::FastDecoder;
use super::fingerprint::Fingerprint;
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

/// Trait for fingerprint algorithm implementations
pub trait ImageHasher: Send + Sync {
    /// Compute a fingerprint from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Decode an in-memory image and fingerprint it
    fn hash_bytes(&self, bytes: &[u8]) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode_bytes(bytes)?;
        self.hash_image(&image)
    }

    /// Read, decode and fingerprint an image file.
    ///
    /// Uses fast decoders for optimal performance:
    /// - JPEG: zune-jpeg (1.5-2x faster)
    /// - Other formats: image crate fallback
    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;
        self.hash_image(&image).map_err(|e| e.with_path(path))
    }

    /// Number of bits in every fingerprint this hasher produces
    fn bit_len(&self) -> usize;
}
