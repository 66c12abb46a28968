/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A range min/max tree over excess values, answering find-close,
//! find-open and enclose on a balanced-parentheses bit sequence.
//!
//! This is the top of the stack: it consumes a [`RankDirectory`] and the
//! [`crate::excess`] byte tables to build per-word and per-superblock
//! excess extrema, then a heap-layout segment tree over superblocks, and
//! answers queries by combining [`crate::paren_scan`] (in-word),
//! per-word extrema (in-superblock) and tree ascent/descent
//! (across-superblock) — the same three-tier block/superblock/tree
//! structure the teacher crate's `Rank9`-family indexes use for rank, one
//! level further to reach excess range queries.
//!
//! Behavior on an unbalanced input bit sequence is undefined: this type
//! performs no validation that the sequence is actually balanced.

use crate::error::Result;
use crate::excess::{MAX_EXCESS, MIN_EXCESS};
use crate::paren_scan::{backward_excess_index, forward_excess_index};
use crate::rank::RankDirectory;
use crate::traits::{check_index, BalancedParentheses, BitLength, Rank};

const WORDS_PER_SUPERBLOCK: usize = 8;

/// A balanced-parentheses search structure built once over an immutable
/// word array.
#[derive(Debug, Clone)]
pub struct BalancedParenTree<'a> {
    rank: RankDirectory<'a>,
    /// Per-word local min/max excess, relative to the start of the word.
    min_e: Vec<i8>,
    max_e: Vec<i8>,
    /// Heap-layout range trees over superblock (global) excess extrema.
    /// Index 0 is an unused sentinel; internal nodes occupy
    /// `1..leaf_base`; leaf `s` sits at `leaf_base + s`.
    min_t: Vec<i64>,
    max_t: Vec<i64>,
    leaf_base: usize,
    super_count: usize,
}

impl<'a> BalancedParenTree<'a> {
    /// Builds a balanced-parentheses index over `words`, considering only
    /// the first `size` bits.
    ///
    /// # Errors
    /// [`Error::BadArgument`](crate::Error::BadArgument) if `size <= 0` or
    /// `size > 32 * words.len()`, per [`RankDirectory::new`].
    pub fn new(words: &'a [u32], size: i64) -> Result<Self> {
        let rank = RankDirectory::new(words, size)?;
        let num_words = rank.len().div_ceil(32);
        let super_count = num_words.div_ceil(WORDS_PER_SUPERBLOCK);

        let (min_e, max_e) = build_word_extrema(words, num_words);

        let leaf_capacity = super_count.max(1).next_power_of_two();
        let total_size = leaf_capacity + super_count;
        let mut min_t = vec![i64::MAX; total_size];
        let mut max_t = vec![i64::MIN; total_size];

        for sb in 0..super_count {
            let start = sb * WORDS_PER_SUPERBLOCK;
            let end = (start + WORDS_PER_SUPERBLOCK).min(num_words);
            let mut sb_min = i64::MAX;
            let mut sb_max = i64::MIN;
            for w in start..end {
                let base = word_base_excess(&rank, w)?;
                sb_min = sb_min.min(base + min_e[w] as i64);
                sb_max = sb_max.max(base + max_e[w] as i64);
            }
            let leaf = leaf_capacity + sb;
            min_t[leaf] = sb_min;
            max_t[leaf] = sb_max;
        }

        for i in (1..leaf_capacity).rev() {
            let (left, right) = (2 * i, 2 * i + 1);
            let left_min = min_t.get(left).copied().unwrap_or(i64::MAX);
            let right_min = min_t.get(right).copied().unwrap_or(i64::MAX);
            min_t[i] = left_min.min(right_min);
            let left_max = max_t.get(left).copied().unwrap_or(i64::MIN);
            let right_max = max_t.get(right).copied().unwrap_or(i64::MIN);
            max_t[i] = left_max.max(right_max);
        }

        log::trace!(
            "built BalancedParenTree over {} words, {} superblocks",
            num_words,
            super_count
        );

        Ok(Self {
            rank,
            min_e,
            max_e,
            min_t,
            max_t,
            leaf_base: leaf_capacity,
            super_count,
        })
    }

    fn superblock_range(&self, sb: usize) -> (usize, usize) {
        let num_words = self.rank.len().div_ceil(32);
        let start = sb * WORDS_PER_SUPERBLOCK;
        let end = (start + WORDS_PER_SUPERBLOCK).min(num_words);
        (start, end)
    }

    fn contains(&self, node: usize, target: i64) -> bool {
        node < self.min_t.len() && target >= self.min_t[node] && target <= self.max_t[node]
    }

    /// Scans superblock `sb` forward, word by word from its first word,
    /// for `target`; used both for the in-superblock phase and as the
    /// landing step after a tree descent.
    fn scan_superblock_forward(&self, sb: usize, target: i64) -> Result<Option<i64>> {
        let (start, end) = self.superblock_range(sb);
        for w in start..end {
            let base = word_base_excess(&self.rank, w)?;
            if target >= base + self.min_e[w] as i64 && target <= base + self.max_e[w] as i64 {
                let excess_at_start = self.rank.excess((w * 32) as i64)?;
                let bit = forward_excess_index(self.rank.words()[w], 0, excess_at_start, target)?;
                if bit < 32 {
                    return Ok(Some((w * 32 + bit as usize) as i64));
                }
            }
        }
        Ok(None)
    }

    /// Scans superblock `sb` backward, word by word from its last word,
    /// for `target`.
    fn scan_superblock_backward(&self, sb: usize, target: i64) -> Result<Option<i64>> {
        let (start, end) = self.superblock_range(sb);
        for w in (start..end).rev() {
            let base = word_base_excess(&self.rank, w)?;
            if target >= base + self.min_e[w] as i64 && target <= base + self.max_e[w] as i64 {
                let word_end = ((w + 1) * 32).min(self.rank.len());
                let excess_at_end = self.rank.excess(word_end as i64 - 1)?;
                let result =
                    backward_excess_index(self.rank.words()[w], 31, excess_at_end, target)?;
                if let Some(offset) = result.offset() {
                    return Ok(Some((w * 32) as i64 + offset));
                }
            }
        }
        Ok(None)
    }

    fn search_forward(&self, p: i64, delta: i64) -> Result<Option<i64>> {
        let p = check_index(p, self.rank.len(), "index")?;
        let target = if p == 0 {
            delta
        } else {
            self.rank.excess(p as i64 - 1)? + delta
        };

        if p % 32 < 31 {
            let word_base = (p / 32) * 32;
            let excess_at_start = self.rank.excess(p as i64 + 1)?;
            let bit = forward_excess_index(
                self.rank.words()[p / 32],
                (p % 32 + 1) as i64,
                excess_at_start,
                target,
            )?;
            if bit < 32 {
                return Ok(Some((word_base + bit as usize) as i64));
            }
        }

        let sb = p / 32 / WORDS_PER_SUPERBLOCK;
        let (_, sb_end) = self.superblock_range(sb);
        let num_words = self.rank.len().div_ceil(32);
        for w in (p / 32 + 1)..sb_end.min(num_words) {
            let base = word_base_excess(&self.rank, w)?;
            if target >= base + self.min_e[w] as i64 && target <= base + self.max_e[w] as i64 {
                let excess_at_start = self.rank.excess((w * 32) as i64)?;
                let bit = forward_excess_index(self.rank.words()[w], 0, excess_at_start, target)?;
                if bit < 32 {
                    return Ok(Some((w * 32 + bit as usize) as i64));
                }
            }
        }

        // Across superblocks: ascend toward the right, then descend
        // preferring the left child (the nearest match on the low side
        // of the found subtree).
        let mut node = self.leaf_base + sb;
        let found = loop {
            let parent = node / 2;
            if parent == 0 {
                break None;
            }
            if node % 2 == 1 {
                node = parent;
                continue;
            }
            let sibling = node + 1;
            if self.contains(sibling, target) {
                break Some(sibling);
            }
            node = parent;
        };
        let Some(mut node) = found else {
            return Ok(None);
        };
        while node < self.leaf_base {
            let left = 2 * node;
            if self.contains(left, target) {
                node = left;
            } else {
                node = 2 * node + 1;
            }
        }
        self.scan_superblock_forward(node - self.leaf_base, target)
    }

    fn search_backward(&self, p: i64, delta: i64) -> Result<Option<i64>> {
        let p = check_index(p, self.rank.len(), "index")?;
        let target = self.rank.excess(p as i64)? - delta;
        if target < 0 {
            return Ok(None);
        }

        if p % 32 > 0 {
            let word_base = (p / 32) * 32;
            let excess_at_start = self.rank.excess(p as i64 - 1)?;
            let result = backward_excess_index(
                self.rank.words()[p / 32],
                (p % 32 - 1) as i64,
                excess_at_start,
                target,
            )?;
            if let Some(offset) = result.offset() {
                return Ok(Some(word_base as i64 + offset));
            }
        }

        let sb = p / 32 / WORDS_PER_SUPERBLOCK;
        let (sb_start, _) = self.superblock_range(sb);
        if p / 32 > sb_start {
            for w in (sb_start..p / 32).rev() {
                let base = word_base_excess(&self.rank, w)?;
                if target >= base + self.min_e[w] as i64 && target <= base + self.max_e[w] as i64 {
                    let word_end = ((w + 1) * 32).min(self.rank.len());
                    let excess_at_end = self.rank.excess(word_end as i64 - 1)?;
                    let result =
                        backward_excess_index(self.rank.words()[w], 31, excess_at_end, target)?;
                    if let Some(offset) = result.offset() {
                        return Ok(Some((w * 32) as i64 + offset));
                    }
                }
            }
        }

        // Across superblocks: ascend toward the left, then descend
        // preferring the right child.
        let mut node = self.leaf_base + sb;
        let found = loop {
            let parent = node / 2;
            if parent == 0 {
                break None;
            }
            if node % 2 == 0 {
                node = parent;
                continue;
            }
            let sibling = node - 1;
            if self.contains(sibling, target) {
                break Some(sibling);
            }
            node = parent;
        };
        let Some(mut node) = found else {
            return Ok(None);
        };
        while node < self.leaf_base {
            let right = 2 * node + 1;
            if self.contains(right, target) {
                node = right;
            } else {
                node = 2 * node;
            }
        }
        self.scan_superblock_backward(node - self.leaf_base, target)
    }
}

impl BitLength for BalancedParenTree<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.rank.len()
    }
}

impl BalancedParentheses for BalancedParenTree<'_> {
    fn find_close(&self, p: i64) -> Result<i64> {
        Ok(self.search_forward(p, 0)?.unwrap_or(-1))
    }

    fn find_open(&self, p: i64) -> Result<i64> {
        Ok(self.search_backward(p, 0)?.unwrap_or(-1))
    }

    fn enclose(&self, p: i64) -> Result<i64> {
        Ok(self.search_backward(p, 2)?.unwrap_or(-1))
    }
}

/// `base + minE[w]`/`base + maxE[w]` is the global excess range spanned
/// by word `w`; `base` is the global excess immediately before the word
/// starts (0 for word 0).
fn word_base_excess(rank: &RankDirectory<'_>, w: usize) -> Result<i64> {
    if w == 0 {
        Ok(0)
    } else {
        rank.excess((w * 32 - 1) as i64)
    }
}

fn build_word_extrema(words: &[u32], num_words: usize) -> (Vec<i8>, Vec<i8>) {
    let mut min_e = Vec::with_capacity(num_words);
    let mut max_e = Vec::with_capacity(num_words);
    for &word in &words[..num_words] {
        let bytes = word.to_le_bytes();
        let mut running = 0i32;
        let mut lo = i32::MAX;
        let mut hi = i32::MIN;
        for &byte in &bytes {
            let byte_lo = running + MIN_EXCESS[byte as usize] as i32;
            let byte_hi = running + MAX_EXCESS[byte as usize] as i32;
            lo = lo.min(byte_lo);
            hi = hi.max(byte_hi);
            running += 2 * byte.count_ones() as i32 - 8;
        }
        min_e.push(lo as i8);
        max_e.push(hi as i8);
    }
    if !min_e.is_empty() {
        min_e[0] = min_e[0].min(0);
    }
    (min_e, max_e)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "(()(()))" LSB-first: bits 1,1,0,1,1,0,0,0.
    fn scenario_3_words() -> [u32; 1] {
        let mut w = 0u32;
        for (i, b) in [1u32, 1, 0, 1, 1, 0, 0, 0].into_iter().enumerate() {
            w |= b << i;
        }
        [w]
    }

    #[test]
    fn scenario_3_from_spec() {
        let words = scenario_3_words();
        let tree = BalancedParenTree::new(&words, 8).unwrap();
        assert_eq!(tree.find_close(0).unwrap(), 7);
        assert_eq!(tree.find_close(1).unwrap(), 2);
        assert_eq!(tree.find_close(3).unwrap(), 6);
        assert_eq!(tree.find_close(4).unwrap(), 5);
        assert_eq!(tree.find_open(7).unwrap(), 0);
        assert_eq!(tree.enclose(3).unwrap(), 0);
        assert_eq!(tree.enclose(1).unwrap(), 0);
        assert_eq!(tree.enclose(4).unwrap(), 3);
        assert_eq!(tree.enclose(0).unwrap(), -1);
    }

    #[test]
    fn find_open_after_find_close_round_trips() {
        let words = scenario_3_words();
        let tree = BalancedParenTree::new(&words, 8).unwrap();
        for p in [0i64, 1, 3, 4] {
            let close = tree.find_close(p).unwrap();
            assert_eq!(tree.find_open(close).unwrap(), p);
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        let words = scenario_3_words();
        let tree = BalancedParenTree::new(&words, 8).unwrap();
        assert!(tree.find_close(-1).is_err());
        assert!(tree.find_close(8).is_err());
    }

    #[test]
    fn single_superblock_degenerates_to_one_leaf() {
        // A single word is one superblock: the tree has no internal
        // nodes, only the root leaf.
        let words = scenario_3_words();
        let tree = BalancedParenTree::new(&words, 8).unwrap();
        assert_eq!(tree.super_count, 1);
        assert_eq!(tree.leaf_base, 1);
    }

    fn stack_baseline(bits: &[bool]) -> (Vec<i64>, Vec<i64>) {
        let mut find_close = vec![-1i64; bits.len()];
        let mut find_open = vec![-1i64; bits.len()];
        let mut stack = Vec::new();
        for (i, &b) in bits.iter().enumerate() {
            if b {
                stack.push(i);
            } else {
                let open = stack.pop().expect("balanced input");
                find_close[open] = i as i64;
                find_open[i] = open as i64;
            }
        }
        (find_close, find_open)
    }

    #[test]
    fn large_scale_matches_stack_baseline() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let n = 1_000_003usize;
        assert_eq!(n % 2, 1); // odd length can't be balanced; trim below.
        let n = n - 1;

        let mut rng = SmallRng::seed_from_u64(0xB17_EBADu64);
        let mut bits = Vec::with_capacity(n);
        let mut depth = 0i64;
        for i in 0..n {
            let remaining = (n - i) as i64;
            let open = if depth == remaining {
                false
            } else if depth == 0 {
                true
            } else {
                rng.gen_bool(0.5)
            };
            bits.push(open);
            depth += if open { 1 } else { -1 };
        }
        assert_eq!(depth, 0);

        let num_words = n.div_ceil(32);
        let mut words = vec![0u32; num_words];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                words[i / 32] |= 1 << (i % 32);
            }
        }

        let tree = BalancedParenTree::new(&words, n as i64).unwrap();
        let (expected_close, expected_open) = stack_baseline(&bits);

        for (p, &is_open) in bits.iter().enumerate() {
            if is_open {
                assert_eq!(tree.find_close(p as i64).unwrap(), expected_close[p]);
            } else {
                assert_eq!(tree.find_open(p as i64).unwrap(), expected_open[p]);
            }
        }
    }
}
