/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A mutable, packed bit container in dynamic or fixed-size mode.
//!
//! [`BitContainer`] is the mutable backing store the rest of this crate's
//! read-only indexes are built over. Bits are packed little-endian into
//! 32-bit words, matching the data model in the crate root docs.

use crate::error::{Error, Result};
use crate::traits::{BitLength, BitSet};

/// The largest bit length this crate supports, `2^31 - 1`, and the
/// reserved index that always fails to `set`.
pub const MAX_BITS: i64 = (1i64 << 31) - 1;

const INITIAL_WORDS: usize = 8;
const MAX_WORDS: i64 = (1i64 << 31) / 32;

/// A packed bit vector, growable ("dynamic" mode) or of a size fixed at
/// construction ("fixed" mode).
#[derive(Debug, Clone)]
pub struct BitContainer {
    words: Vec<u32>,
    size: usize,
    fixed: bool,
}

impl BitContainer {
    /// Creates an empty dynamic container, starting with 8 words (256
    /// bits) of backing storage. `set` beyond the current size grows the
    /// container automatically.
    pub fn new_dynamic() -> Self {
        let words = vec![0u32; INITIAL_WORDS];
        let size = INITIAL_WORDS * 32;
        Self {
            words,
            size,
            fixed: false,
        }
    }

    /// Creates a fixed-size container of exactly `size` bits, all
    /// initially zero. `set` beyond `size` fails with
    /// [`Error::OutOfRange`].
    ///
    /// # Errors
    /// [`Error::BadArgument`] if `size` is negative or exceeds
    /// [`MAX_BITS`].
    pub fn new_fixed(size: i64) -> Result<Self> {
        if !(0..=MAX_BITS).contains(&size) {
            return Err(Error::bad_argument(format!(
                "size must satisfy 0 <= size <= {MAX_BITS}, got {size}"
            )));
        }
        let size = size as usize;
        let word_count = size.div_ceil(32);
        Ok(Self {
            words: vec![0u32; word_count],
            size,
            fixed: true,
        })
    }

    /// Returns the word at index `k`, for the caller to adapt into other
    /// representations; equivalent to `self.words()[k]`.
    #[inline]
    pub fn word(&self, k: usize) -> u32 {
        self.words[k]
    }

    /// Returns the number of 32-bit words backing this container.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Overwrites the whole 32-bit word at index `k`.
    ///
    /// In dynamic mode, a `k` beyond the current word count grows the
    /// container first, exactly as `set` does.
    ///
    /// # Errors
    /// [`Error::OutOfRange`] if `k` is negative, `k >= 2^31 / 32`, or (in
    /// fixed mode) `k >= self.word_count()`.
    pub fn set_word(&mut self, k: i64, v: u32) -> Result<()> {
        if k < 0 || k >= MAX_WORDS {
            return Err(Error::out_of_range(
                k,
                format!("word index must satisfy 0 <= k < {MAX_WORDS}"),
            ));
        }
        let k = k as usize;
        if k >= self.words.len() {
            if self.fixed {
                return Err(Error::out_of_range(
                    k as i64,
                    format!("word index must satisfy 0 <= k < {}", self.words.len()),
                ));
            }
            self.grow_to_cover_word(k);
        }
        self.words[k] = v;
        Ok(())
    }

    /// Returns the underlying word array without copying.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Copies the container's bits into a fresh `Vec<u32>` of exactly
    /// `new_size` bits: truncated or zero-padded as needed, with any bits
    /// beyond `new_size` in the last word cleared.
    ///
    /// # Errors
    /// [`Error::BadArgument`] if `new_size` is negative or exceeds
    /// [`MAX_BITS`].
    pub fn to_words(&self, new_size: i64) -> Result<Vec<u32>> {
        if !(0..=MAX_BITS).contains(&new_size) {
            return Err(Error::bad_argument(format!(
                "new_size must satisfy 0 <= new_size <= {MAX_BITS}, got {new_size}"
            )));
        }
        let new_size = new_size as usize;
        let new_word_count = new_size.div_ceil(32);
        let mut out = vec![0u32; new_word_count];
        let copy_words = new_word_count.min(self.words.len());
        out[..copy_words].copy_from_slice(&self.words[..copy_words]);
        let tail_bits = new_size % 32;
        if tail_bits != 0 && new_word_count > 0 {
            let mask = (1u32 << tail_bits) - 1;
            out[new_word_count - 1] &= mask;
        }
        Ok(out)
    }

    fn grow_to_cover_word(&mut self, word_index: usize) {
        let mut new_word_count = self.words.len().max(1) * 2;
        if new_word_count <= word_index {
            new_word_count = word_index + 1;
        }
        let max_word_count = MAX_WORDS as usize;
        let new_word_count = new_word_count.min(max_word_count);
        self.words.resize(new_word_count, 0);
        self.size = (self.words.len() * 32).min(MAX_BITS as usize);
    }
}

impl BitLength for BitContainer {
    #[inline]
    fn len(&self) -> usize {
        self.size
    }
}

impl BitSet for BitContainer {
    fn get(&self, i: i64) -> Result<bool> {
        if i < 0 || i as u64 >= self.size as u64 {
            return Err(Error::out_of_range(
                i,
                format!("index must satisfy 0 <= i < {}", self.size),
            ));
        }
        let i = i as usize;
        let word = self.words[i / 32];
        Ok((word >> (i % 32)) & 1 == 1)
    }

    fn set(&mut self, i: i64, v: bool) -> Result<()> {
        if i < 0 || i >= MAX_BITS {
            return Err(Error::out_of_range(i, "index must satisfy 0 <= i < 2^31 - 1"));
        }
        if self.fixed {
            if i as u64 >= self.size as u64 {
                return Err(Error::out_of_range(
                    i,
                    format!("index must satisfy 0 <= i < {} (fixed mode)", self.size),
                ));
            }
        } else if i as u64 >= self.size as u64 {
            self.grow_to_cover_word((i / 32) as usize);
        }
        let i = i as usize;
        let word_index = i / 32;
        let bit = i % 32;
        if v {
            self.words[word_index] |= 1 << bit;
        } else {
            self.words[word_index] &= !(1 << bit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_starts_at_256_bits() {
        let c = BitContainer::new_dynamic();
        assert_eq!(c.len(), 256);
        assert_eq!(c.word_count(), 8);
    }

    #[test]
    fn dynamic_grows_on_out_of_range_set() {
        let mut c = BitContainer::new_dynamic();
        c.set(1000, true).unwrap();
        assert!(c.len() > 1000);
        assert!(c.get(1000).unwrap());
        assert!(!c.get(999).unwrap());
    }

    #[test]
    fn fixed_rejects_out_of_range_set() {
        let mut c = BitContainer::new_fixed(10).unwrap();
        assert!(c.set(10, true).is_err());
        assert!(c.set(-1, true).is_err());
        c.set(9, true).unwrap();
        assert!(c.get(9).unwrap());
    }

    #[test]
    fn set_rejects_reserved_index() {
        let mut c = BitContainer::new_dynamic();
        assert!(c.set(MAX_BITS, true).is_err());
    }

    #[test]
    fn set_rejects_indices_beyond_reserved_index() {
        let mut c = BitContainer::new_dynamic();
        assert!(c.set(MAX_BITS + 1, true).is_err());
        assert!(c.set(MAX_BITS + 1_000_000, true).is_err());
    }

    #[test]
    fn to_words_truncates_and_clears_tail_bits() {
        let mut c = BitContainer::new_fixed(64).unwrap();
        for i in 0..64 {
            c.set(i, true).unwrap();
        }
        let words = c.to_words(10).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0], 0b11_1111_1111);
    }

    #[test]
    fn to_words_pads_with_zeros() {
        let c = BitContainer::new_fixed(8).unwrap();
        let words = c.to_words(40).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0], 0);
        assert_eq!(words[1], 0);
    }

    #[test]
    fn set_word_writes_whole_word() {
        let mut c = BitContainer::new_fixed(64).unwrap();
        c.set_word(1, 0xDEAD_BEEF).unwrap();
        assert_eq!(c.word(1), 0xDEAD_BEEF);
    }
}
