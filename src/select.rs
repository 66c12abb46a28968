/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A sampling select₁ index layered on top of [`RankDirectory`].
//!
//! Every 256th one-bit is sampled into an array of small-block (word)
//! indices; `select` uses a sample as a starting seed and then performs
//! the same kind of forward-only refinement the teacher crate's inventory-
//! based select structures (`SimpleSelectConst`) use over their own
//! per-inventory samples, before finishing with a word-local low-bit-clear
//! scan.

use crate::error::Result;
use crate::rank::RankDirectory;
use crate::traits::{check_index, BitLength, Rank, Select};

/// Number of one-bits between consecutive samples.
const SAMPLE_PERIOD: usize = 256;
const WORDS_PER_LARGE_BLOCK: usize = 8;

/// A select₁ index: a sampling directory over a [`RankDirectory`].
#[derive(Debug, Clone)]
pub struct SelectIndex<'a> {
    rank: RankDirectory<'a>,
    /// `samples[s]` is (one less than) the small-block index containing
    /// the `(s * 256 + 1)`-th one-bit: the last small block before that
    /// milestone's crossover. A trailing sentinel entry is always present.
    samples: Vec<usize>,
}

impl<'a> SelectIndex<'a> {
    /// Builds a select index layered over `rank`.
    pub fn new(rank: RankDirectory<'a>) -> Self {
        let words = rank.words();
        let num_words = rank.len().div_ceil(32).min(words.len());
        let total_rank = rank.total_rank();

        let mut samples = Vec::new();
        let mut next_milestone = 1usize;
        for w in 0..num_words {
            if next_milestone > total_rank {
                break;
            }
            let block = w / WORDS_PER_LARGE_BLOCK;
            let rank_before = rank.large_rank(block) + rank.small_rank(w) as usize;
            let rank_after = rank_before + words[w].count_ones() as usize;
            while next_milestone <= rank_after && next_milestone <= total_rank {
                samples.push(w.saturating_sub(1));
                next_milestone += SAMPLE_PERIOD;
            }
        }
        samples.push(num_words.saturating_sub(1));

        log::trace!(
            "built SelectIndex over {} one-bits with {} samples",
            total_rank,
            samples.len()
        );

        Self { rank, samples }
    }

    /// Returns the underlying rank directory.
    pub fn rank_directory(&self) -> &RankDirectory<'a> {
        &self.rank
    }

    #[inline]
    fn sample(&self, s: usize) -> usize {
        self.samples
            .get(s)
            .copied()
            .unwrap_or_else(|| *self.samples.last().unwrap())
    }
}

impl BitLength for SelectIndex<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.rank.len()
    }
}

impl Rank for SelectIndex<'_> {
    #[inline]
    fn rank(&self, i: i64) -> Result<usize> {
        self.rank.rank(i)
    }

    #[inline]
    fn total_rank(&self) -> usize {
        self.rank.total_rank()
    }
}

impl Select for SelectIndex<'_> {
    fn select(&self, i: i64) -> Result<i64> {
        let i = check_index(i, self.rank.len(), "index")? as i64;
        let total_rank = self.rank.total_rank();
        if i as u64 >= total_rank as u64 {
            return Ok(-1);
        }
        let i = i as usize;
        let words = self.rank.words();

        // Step 2: locate the large block.
        let mut large_block = self.sample(i / SAMPLE_PERIOD) / WORDS_PER_LARGE_BLOCK;
        let mut r = i + 1;
        while r > self.rank.large_rank(large_block + 1) {
            large_block += 1;
        }
        r -= self.rank.large_rank(large_block);

        // Step 3: locate the small block (word) within the large block.
        let boundary = ((large_block + 1) * WORDS_PER_LARGE_BLOCK).min(
            self.rank.len().div_ceil(32).min(words.len()),
        );
        let mut small = large_block * WORDS_PER_LARGE_BLOCK + (r - 1) / 32 + 1;
        while small < boundary && (self.rank.small_rank(small) as usize) < r {
            small += 1;
        }
        small -= 1;
        r -= self.rank.small_rank(small) as usize;

        // Step 4: locate the bit within the word.
        let mut word = words[small];
        for _ in 0..r - 1 {
            word = (word - 1) & word;
        }
        Ok((small * 32 + word.trailing_zeros() as usize) as i64)
    }
}
