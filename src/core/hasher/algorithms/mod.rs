//! Hash algorithm implementations.

mod perceptual;

pub use perceptual::PerceptualHasher;
