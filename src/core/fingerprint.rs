//! Perceptual fingerprints and the bit-difference metric.
//!
//! A fingerprint is an average hash (aHash): each cell of a downsampled
//! luminance grid contributes one bit, set when the cell is at or above the
//! grid's mean brightness. Visually similar images differ in few bits, so
//! the Hamming distance between fingerprints measures similarity.

use crate::error::DistanceError;
use serde::{Deserialize, Serialize};

/// Sample grid resolution for fingerprint extraction.
///
/// Selects how many luminance samples back the fingerprint:
/// - `Standard`: 8x8 grid, 64-bit fingerprint, fast
/// - `Fine`: 16x16 grid, 256-bit fingerprint, better separation between
///   near-misses (default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSize {
    Standard,
    Fine,
}

impl GridSize {
    /// Samples per side of the grid
    pub fn cells(self) -> u32 {
        match self {
            GridSize::Standard => 8,
            GridSize::Fine => 16,
        }
    }

    /// Total bits in a fingerprint at this resolution
    pub fn bits(self) -> u32 {
        self.cells() * self.cells()
    }

    /// Recover the grid size from a fingerprint bit-length
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            64 => Some(GridSize::Standard),
            256 => Some(GridSize::Fine),
            _ => None,
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::Fine
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.cells();
        write!(f, "{}x{}", s, s)
    }
}

/// A fixed-length perceptual fingerprint.
///
/// Bits are packed row-major: sample `i = y*S + x` lands in byte `i / 8` at
/// bit position `i % 8`, least-significant first. The packing order is fixed
/// so fingerprints round-trip through the cache byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Compute the fingerprint of an S*S sample grid.
    ///
    /// `samples` must contain exactly `grid.bits()` luminance values in
    /// row-major order; anything else (including a zero-area grid) yields
    /// `None` rather than a fingerprint of zeroes.
    ///
    /// The mean is integer division truncated toward zero, and a sample
    /// *equal* to the mean sets its bit. The inclusive comparison keeps two
    /// identical solid-color images at distance 0 instead of letting ties
    /// flip bits arbitrarily - a uniformly flat grid is all ones.
    pub fn of_samples(samples: &[u8], grid: GridSize) -> Option<Self> {
        let total = grid.bits() as usize;
        if samples.len() != total {
            return None;
        }

        let sum: u64 = samples.iter().map(|&s| s as u64).sum();
        let average = (sum / total as u64) as u8;

        let mut bytes = vec![0u8; total / 8];
        for (i, &sample) in samples.iter().enumerate() {
            if sample >= average {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }

        Some(Self { bytes })
    }

    /// Restore a fingerprint from raw bytes (cache restoration)
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Raw fingerprint bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total number of bits in this fingerprint
    pub fn bit_len(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }

    /// A zero-length fingerprint carries no information and marks an
    /// unhashable file, never a valid all-zero hash.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hexadecimal rendering for logs and JSON output
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hamming distance to another fingerprint of the same bit-length.
    ///
    /// Counts differing bits: symmetric, zero iff the fingerprints are
    /// identical, at most `bit_len()`. Comparing fingerprints of different
    /// lengths is a contract violation and returns an error - it is never a
    /// distance of 0.
    pub fn distance(&self, other: &Self) -> Result<u32, DistanceError> {
        if self.bit_len() != other.bit_len() {
            return Err(DistanceError::LengthMismatch {
                left_bits: self.bit_len(),
                right_bits: other.bit_len(),
            });
        }

        Ok(self.popcount_xor(other))
    }

    /// Hamming distance that degrades instead of failing.
    ///
    /// On a length mismatch (or an empty fingerprint) returns one more than
    /// the larger bit-length - farther than any real pair can be, so the
    /// records can never cluster - and logs a warning. Used inside long
    /// scans where one stray record must not abort the run.
    pub fn distance_saturating(&self, other: &Self) -> u32 {
        if self.bit_len() != other.bit_len() || self.is_empty() {
            tracing::warn!(
                left_bits = self.bit_len(),
                right_bits = other.bit_len(),
                "fingerprint length mismatch, treating as maximally distant"
            );
            return self.bit_len().max(other.bit_len()) + 1;
        }

        self.popcount_xor(other)
    }

    fn popcount_xor(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint_of(samples: &[u8]) -> Fingerprint {
        Fingerprint::of_samples(samples, GridSize::Standard).unwrap()
    }

    #[test]
    fn flat_grid_is_all_ones() {
        // Every sample equals the mean; the inclusive comparison sets
        // every bit.
        let fp = fingerprint_of(&[128; 64]);
        assert!(fp.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(fp.bit_len(), 64);
    }

    #[test]
    fn extraction_is_deterministic() {
        let samples: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let a = fingerprint_of(&samples);
        let b = fingerprint_of(&samples);
        assert_eq!(a, b);
    }

    #[test]
    fn mean_truncates_toward_zero() {
        // Samples 0..64 sum to 2016; 2016/64 = 31.5 truncates to 31, so
        // samples 31..=63 set their bits: 33 ones.
        let samples: Vec<u8> = (0..64).collect();
        let fp = fingerprint_of(&samples);
        let ones: u32 = fp.as_bytes().iter().map(|b| b.count_ones()).sum();
        assert_eq!(ones, 33);
    }

    #[test]
    fn bits_pack_row_major_lsb_first() {
        // Only sample 0 clears its bit (below the mean), so byte 0 is
        // 0b1111_1110 and the rest are full.
        let mut samples = [200u8; 64];
        samples[0] = 0;
        let fp = fingerprint_of(&samples);
        assert_eq!(fp.as_bytes()[0], 0b1111_1110);
        assert!(fp.as_bytes()[1..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn wrong_sample_count_yields_none() {
        assert!(Fingerprint::of_samples(&[1, 2, 3], GridSize::Standard).is_none());
        assert!(Fingerprint::of_samples(&[], GridSize::Standard).is_none());
        assert!(Fingerprint::of_samples(&[0; 64], GridSize::Fine).is_none());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let fp = fingerprint_of(&[7; 64]);
        assert_eq!(fp.distance(&fp).unwrap(), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = fingerprint_of(&(0..64).collect::<Vec<u8>>());
        let b = fingerprint_of(&(0..64).rev().collect::<Vec<u8>>());
        assert_eq!(a.distance(&b).unwrap(), b.distance(&a).unwrap());
    }

    #[test]
    fn distance_is_bounded_by_bit_length() {
        let a = Fingerprint::from_bytes(&[0xFF; 8]);
        let b = Fingerprint::from_bytes(&[0x00; 8]);
        let d = a.distance(&b).unwrap();
        assert_eq!(d, 64);
        assert!(d <= a.bit_len());
    }

    #[test]
    fn length_mismatch_is_an_error_not_zero() {
        let a = Fingerprint::from_bytes(&[0xAA; 8]);
        let b = Fingerprint::from_bytes(&[0xAA; 32]);
        assert_eq!(
            a.distance(&b),
            Err(DistanceError::LengthMismatch {
                left_bits: 64,
                right_bits: 256,
            })
        );
    }

    #[test]
    fn saturating_distance_uses_sentinel_on_mismatch() {
        let a = Fingerprint::from_bytes(&[0xAA; 8]);
        let b = Fingerprint::from_bytes(&[0xAA; 32]);
        // One past the larger bit-length: beyond any real distance.
        assert_eq!(a.distance_saturating(&b), 257);
    }

    #[test]
    fn empty_fingerprint_is_maximally_distant() {
        let empty = Fingerprint::from_bytes(&[]);
        let real = Fingerprint::from_bytes(&[0x00; 8]);
        assert!(empty.is_empty());
        assert_eq!(empty.distance_saturating(&real), 65);
    }

    #[test]
    fn grid_size_round_trips_through_bits() {
        assert_eq!(GridSize::from_bits(64), Some(GridSize::Standard));
        assert_eq!(GridSize::from_bits(256), Some(GridSize::Fine));
        assert_eq!(GridSize::from_bits(128), None);
    }

    #[test]
    fn to_hex_renders_bytes() {
        let fp = Fingerprint::from_bytes(&[0xDE, 0xAD]);
        assert_eq!(fp.to_hex(), "dead");
    }
}
