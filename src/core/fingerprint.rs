use crate::error::FingerprintError;
use serde::{Serialize, Serializer};
use std::fmt;

const WORD_BITS: usize = 64;

/// Fixed-length bit vector produced by a perceptual hash.
///
/// Bits are packed into `u64` words, bit `i` living at position `i % 64` of
/// word `i / 64`. Bits past `len` are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    len: usize,
}

impl Fingerprint {
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut words = Vec::new();
        let mut len = 0;
        for bit in bits {
            if len % WORD_BITS == 0 {
                words.push(0);
            }
            if bit {
                words[len / WORD_BITS] |= 1u64 << (len % WORD_BITS);
            }
            len += 1;
        }
        Self { words, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1)
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of differing bit positions.
    pub fn hamming_distance(&self, other: &Fingerprint) -> Result<u32, FingerprintError> {
        if self.len != other.len {
            return Err(FingerprintError::LengthMismatch {
                left: self.len,
                right: other.len,
            });
        }
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Hex rendering, four bits per digit, first bit most significant.
    pub fn to_hex(&self) -> String {
        let bits: Vec<bool> = self.bits().collect();
        bits.chunks(4)
            .map(|nibble| {
                let value = nibble
                    .iter()
                    .enumerate()
                    .fold(0u32, |acc, (i, &bit)| if bit { acc | 1u32 << (3 - i) } else { acc });
                char::from_digit(value, 16).unwrap_or('0')
            })
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
