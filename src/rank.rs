/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A two-level, Jacobson-style rank₁ directory.
//!
//! `RankDirectory` stores absolute cumulative one-counts for 256-bit
//! ("large") blocks and relative cumulative one-counts, within the
//! owning large block, for 32-bit ("small") blocks — one word each. This
//! mirrors the two-level counter layout the teacher crate's `Rank9` uses
//! for 512-bit/64-bit blocks, scaled down to this crate's 32-bit word
//! size: eight words per large block either way.

use crate::error::{Error, Result};
use crate::traits::{check_index, BitLength, BitSet, Rank};

const WORDS_PER_LARGE_BLOCK: usize = 8;

/// A rank₁ directory built once, by reference, over an immutable 32-bit
/// word array.
#[derive(Debug, Clone)]
pub struct RankDirectory<'a> {
    words: &'a [u32],
    size: usize,
    /// `large[k]` = rank₁ up to (not including) large block `k`. Length
    /// `ceil(word_count / 8) + 1`; the last entry is the total rank.
    large: Vec<usize>,
    /// `small[j]` = rank₁ within the owning large block up to (not
    /// including) small block (word) `j`. One entry per word.
    small: Vec<u8>,
}

impl<'a> RankDirectory<'a> {
    /// Builds a rank directory over `words`, considering only the first
    /// `size` bits.
    ///
    /// # Errors
    /// [`Error::BadArgument`] if `size <= 0` or `size > 32 * words.len()`.
    pub fn new(words: &'a [u32], size: i64) -> Result<Self> {
        if size <= 0 || size as u64 > 32u64 * words.len() as u64 {
            return Err(Error::bad_argument(format!(
                "size must satisfy 0 < size <= 32 * {}, got {size}",
                words.len()
            )));
        }
        let size = size as usize;
        let num_words = size.div_ceil(32);
        let num_large = num_words.div_ceil(WORDS_PER_LARGE_BLOCK);

        let mut large = Vec::with_capacity(num_large + 1);
        let mut small = vec![0u8; num_words];

        let mut cumulative = 0usize;
        for block in 0..num_large {
            large.push(cumulative);
            let mut running_in_block = 0u32;
            let start = block * WORDS_PER_LARGE_BLOCK;
            let end = (start + WORDS_PER_LARGE_BLOCK).min(num_words);
            for word_index in start..end {
                small[word_index] = running_in_block as u8;
                running_in_block += words[word_index].count_ones();
            }
            cumulative += running_in_block as usize;
        }
        large.push(cumulative);

        log::trace!(
            "built RankDirectory over {} words ({} bits): {} large blocks, total rank {}",
            num_words,
            size,
            num_large,
            cumulative
        );

        Ok(Self {
            words,
            size,
            large,
            small,
        })
    }

    /// Returns the underlying word array.
    #[inline]
    pub fn words(&self) -> &'a [u32] {
        self.words
    }

    /// Returns `large[k]`, the cumulative rank before large block `k`.
    #[inline]
    pub(crate) fn large_rank(&self, block: usize) -> usize {
        self.large[block]
    }

    /// Returns `small[word]`, the cumulative rank within the owning large
    /// block, before `word`.
    #[inline]
    pub(crate) fn small_rank(&self, word: usize) -> u8 {
        self.small[word]
    }
}

impl BitLength for RankDirectory<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.size
    }
}

impl Rank for RankDirectory<'_> {
    fn rank(&self, i: i64) -> Result<usize> {
        let i = check_index(i, self.size, "index")?;
        Ok(unsafe { self.rank_unchecked(i) })
    }

    #[inline]
    fn total_rank(&self) -> usize {
        *self.large.last().unwrap()
    }
}

/// A read-only view: `get` reads through to the underlying word array,
/// but `set` always fails, since a directory built over borrowed data
/// cannot mutate it.
impl BitSet for RankDirectory<'_> {
    fn get(&self, i: i64) -> Result<bool> {
        let i = check_index(i, self.size, "index")?;
        Ok((self.words[i / 32] >> (i % 32)) & 1 == 1)
    }

    fn set(&mut self, _i: i64, _v: bool) -> Result<()> {
        Err(Error::unsupported("set"))
    }
}

impl RankDirectory<'_> {
    /// Computes `rank(i)` without bounds checking.
    ///
    /// # Safety
    /// `i` must be `< self.len()`.
    #[inline(always)]
    pub(crate) unsafe fn rank_unchecked(&self, i: usize) -> usize {
        let word_index = i / 32;
        let large_block = word_index / WORDS_PER_LARGE_BLOCK;
        let bit_in_word = (i % 32) as u32;
        let mask = low_mask_inclusive(bit_in_word);
        let in_word = (self.words.get_unchecked(word_index) & mask).count_ones();
        self.large.get_unchecked(large_block)
            + *self.small.get_unchecked(word_index) as usize
            + in_word as usize
    }
}

/// The mask covering bits `0..=bit` (inclusive), i.e. `bit + 1` low bits
/// set, matching the spec's `(-1) >>> (31 - bit)` construction.
#[inline(always)]
fn low_mask_inclusive(bit: u32) -> u32 {
    if bit == 31 {
        u32::MAX
    } else {
        (1u32 << (bit + 1)) - 1
    }
}
