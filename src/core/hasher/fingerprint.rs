//! The fingerprint value type.
//!
//! A fingerprint is a fixed-length bit sequence. Bits are packed MSB-first
//! into bytes; padding bits in the last byte are always zero, so Hamming
//! distance can be computed byte-wise.
//!
//! The text form is one `'0'`/`'1'` character per bit in emission order.
//! This is also the form used by serde and by corpus files.

use crate::error::{CompareError, ParseFingerprintError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A perceptual fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint {
    bytes: Vec<u8>,
    len: usize,
}

impl Fingerprint {
    /// Pack a sequence of bits
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bytes = Vec::new();
        let mut len = 0;

        for bit in bits {
            if len % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                if let Some(last) = bytes.last_mut() {
                    *last |= 1 << (7 - len % 8);
                }
            }
            len += 1;
        }

        Self { bytes, len }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length fingerprint
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`, or `None` past the end
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bytes[index / 8] & (1 << (7 - index % 8)) != 0)
    }

    /// Iterate over the bits in emission order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bytes[i / 8] & (1 << (7 - i % 8)) != 0)
    }

    /// Packed bytes (MSB-first, zero padded)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The `'0'`/`'1'` text form
    pub fn to_bit_string(&self) -> String {
        self.bits().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// Packed bytes as lowercase hex
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hamming distance: the number of positions at which the bits differ.
    ///
    /// Fails when the lengths differ, which means the two fingerprints were
    /// produced by different hasher configurations.
    pub fn distance(&self, other: &Self) -> Result<u32, CompareError> {
        if self.len != other.len {
            return Err(CompareError::LengthMismatch {
                left: self.len,
                right: other.len,
            });
        }

        Ok(self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Similarity as a percentage (0-100)
    pub fn similarity(&self, other: &Self) -> Result<f64, CompareError> {
        let distance = self.distance(other)?;
        if self.len == 0 {
            return Ok(100.0);
        }
        Ok((1.0 - (distance as f64 / self.len as f64)) * 100.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseFingerprintError::Empty);
        }

        let bits = s
            .chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(ParseFingerprintError::InvalidCharacter { position, found }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_bits(bits))
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.to_bit_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseFingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> Fingerprint {
        s.parse().unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let hash = fp("1011001110001");
        assert_eq!(hash.distance(&hash), Ok(0));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = fp("111111111");
        let b = fp("000000000");

        assert_eq!(a.distance(&b), Ok(9));
    }

    /// Deterministic 63-bit fingerprints from a linear congruential sequence
    fn generated(count: usize) -> Vec<(Vec<bool>, Fingerprint)> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..count)
            .map(|_| {
                let bits: Vec<bool> = (0..63)
                    .map(|_| {
                        state = state
                            .wrapping_mul(6_364_136_223_846_793_005)
                            .wrapping_add(1_442_695_040_888_963_407);
                        state >> 63 == 1
                    })
                    .collect();
                let hash = Fingerprint::from_bits(bits.iter().copied());
                (bits, hash)
            })
            .collect()
    }

    #[test]
    fn distance_is_a_metric_over_generated_fingerprints() {
        let samples = generated(16);

        for (bits_a, a) in &samples {
            for (bits_b, b) in &samples {
                let ab = a.distance(b).unwrap();
                let differing = bits_a.iter().zip(bits_b).filter(|(x, y)| x != y).count();

                assert_eq!(ab as usize, differing);
                assert_eq!(Ok(ab), b.distance(a));
                assert_eq!(ab == 0, bits_a == bits_b);

                for (_, c) in &samples {
                    let ac = a.distance(c).unwrap();
                    let bc = b.distance(c).unwrap();
                    assert!(ac <= ab + bc);
                }
            }
        }
    }

    #[test]
    fn distance_rejects_unequal_lengths() {
        let a = fp("101");
        let b = fp("1010");

        assert_eq!(
            a.distance(&b),
            Err(CompareError::LengthMismatch { left: 3, right: 4 })
        );
    }

    #[test]
    fn bit_string_round_trips_with_padding() {
        let text = "1011001110";
        let hash = fp(text);

        assert_eq!(hash.len(), 10);
        assert_eq!(hash.as_bytes(), &[0b1011_0011, 0b1000_0000]);
        assert_eq!(hash.to_string(), text);
    }

    #[test]
    fn bit_reads_individual_positions() {
        let hash = fp("0100");
        assert_eq!(hash.bit(1), Some(true));
        assert_eq!(hash.bit(2), Some(false));
        assert_eq!(hash.bit(4), None);
    }

    #[test]
    fn parse_rejects_other_characters() {
        assert_eq!(
            "01x1".parse::<Fingerprint>(),
            Err(ParseFingerprintError::InvalidCharacter {
                position: 2,
                found: 'x'
            })
        );
        assert_eq!("".parse::<Fingerprint>(), Err(ParseFingerprintError::Empty));
    }

    #[test]
    fn similarity_is_100_for_identical_and_0_for_opposite() {
        let a = fp("11110000");
        let b = fp("00001111");

        assert_eq!(a.similarity(&a), Ok(100.0));
        assert_eq!(a.similarity(&b), Ok(0.0));
    }

    #[test]
    fn to_hex_uses_packed_bytes() {
        assert_eq!(fp("1101111010101101").to_hex(), "dead");
    }

    #[test]
    fn serializes_as_bit_string() {
        let hash = fp("10110");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"10110\"");

        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
