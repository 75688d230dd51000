//! Image decoding from files and byte buffers.
//!
//! JPEG goes through zune-jpeg (1.5-2x faster than the image crate),
//! everything else through the image crate. Files of 1MB or more are
//! memory-mapped instead of copied into a buffer.

use crate::error::HashError;
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma, Rgb, Rgba};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File contents, either owned or memory-mapped
enum FileBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Owned(v) => v,
            FileBytes::Mapped(m) => m,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> HashError {
    HashError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

fn read_file_bytes(path: &Path) -> Result<FileBytes, HashError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let len = file.metadata().map_err(|e| io_error(path, e))?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: the map is read-only and owns the file handle for its lifetime.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| io_error(path, e))?;
        Ok(FileBytes::Mapped(mmap))
    } else {
        std::fs::read(path)
            .map(FileBytes::Owned)
            .map_err(|e| io_error(path, e))
    }
}

fn decode_error(reason: impl Into<String>) -> HashError {
    HashError::DecodeError {
        path: PathBuf::new(),
        reason: reason.into(),
    }
}

/// Decoder that picks the fastest available codec per format
pub struct FastDecoder;

impl FastDecoder {
    /// Read and decode an image file
    pub fn decode(path: &Path) -> Result<DynamicImage, HashError> {
        let bytes = read_file_bytes(path)?;
        Self::decode_bytes(bytes.as_ref()).map_err(|e| e.with_path(path))
    }

    /// Decode an in-memory image. The format is sniffed from the content.
    pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, HashError> {
        if bytes.is_empty() {
            return Err(HashError::EmptyImage {
                path: PathBuf::new(),
            });
        }

        let image = match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => {
                Self::decode_jpeg(bytes).or_else(|_| Self::decode_fallback(bytes))?
            }
            _ => Self::decode_fallback(bytes)?,
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(HashError::EmptyImage {
                path: PathBuf::new(),
            });
        }

        Ok(image)
    }

    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, HashError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| decode_error(format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| decode_error("Failed to get image info"))?;

        let width = info.width as u32;
        let height = info.height as u32;

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGB buffer"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGBA buffer"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create Luma buffer"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => return Err(decode_error(format!("Unsupported colorspace {:?}", other))),
        };

        Ok(image)
    }

    fn decode_fallback(bytes: &[u8]) -> Result<DynamicImage, HashError> {
        image::load_from_memory(bytes).map_err(|e| decode_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use std::io::Cursor;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, 90])
        }))
    }

    fn encode_png(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_bytes() {
        let decoded = FastDecoder::decode_bytes(&encode_png(&gradient(40, 30))).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30));
    }

    #[test]
    fn decodes_jpeg_bytes() {
        let mut bytes = Vec::new();
        gradient(48, 32)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, 90))
            .unwrap();

        let decoded = FastDecoder::decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (48, 32));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = FastDecoder::decode_bytes(b"this is not a valid image file");
        assert!(matches!(result, Err(HashError::DecodeError { .. })));
    }

    #[test]
    fn empty_buffer_is_an_empty_image() {
        let result = FastDecoder::decode_bytes(&[]);
        assert!(matches!(result, Err(HashError::EmptyImage { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error_with_path() {
        let path = Path::new("/nonexistent/photo-12345.png");
        match FastDecoder::decode(path) {
            Err(HashError::IoError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected IoError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn decode_errors_from_files_carry_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let message = FastDecoder::decode(&path).unwrap_err().to_string();
        assert!(message.contains("broken.png"));
    }
}
