/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! End-to-end tests wiring [`BitContainer`] into the read-only indexes
//! built over its word array, mirroring how an embedding succinct-tree
//! implementation would use this crate.

use sux_bp::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn container_feeds_rank_and_select() {
    init();
    let mut bc = BitContainer::new_fixed(64).unwrap();
    for i in [1i64, 3, 4, 9, 40, 63] {
        bc.set(i, true).unwrap();
    }
    let words = bc.to_words(64).unwrap();
    let select = SelectIndex::new(RankDirectory::new(&words, 64).unwrap());

    assert_eq!(select.total_rank(), 6);
    assert_eq!(select.select(0).unwrap(), 1);
    assert_eq!(select.select(5).unwrap(), 63);
    assert_eq!(select.select(6).unwrap(), -1);
    assert_eq!(select.rank(63).unwrap(), 6);
}

#[test]
fn container_feeds_balanced_parens() {
    init();
    // "((()))" followed by padding closes, to keep the word fully balanced.
    let open_close = [true, true, true, false, false, false];
    let mut bc = BitContainer::new_fixed(open_close.len() as i64).unwrap();
    for (i, &b) in open_close.iter().enumerate() {
        bc.set(i as i64, b).unwrap();
    }
    let words = bc.to_words(open_close.len() as i64).unwrap();
    let tree = BalancedParenTree::new(&words, open_close.len() as i64).unwrap();

    assert_eq!(tree.find_close(0).unwrap(), 5);
    assert_eq!(tree.find_close(1).unwrap(), 4);
    assert_eq!(tree.find_close(2).unwrap(), 3);
    assert_eq!(tree.find_open(5).unwrap(), 0);
    assert_eq!(tree.enclose(1).unwrap(), 0);
    assert_eq!(tree.enclose(0).unwrap(), -1);
}

#[test]
fn compact_int_array_sizes_a_rank_directory_sample_table() {
    // A realistic use: packing per-large-block cumulative ranks, the same
    // shape of data RankDirectory itself keeps as a plain Vec<usize>.
    let cumulative: Vec<u64> = (0..64).map(|i| i * 37 % 900).collect();
    let max = *cumulative.iter().max().unwrap() as i64;
    let packed = CompactIntArray::new(&cumulative, max).unwrap();
    for (i, &v) in cumulative.iter().enumerate() {
        assert_eq!(packed.get(i as i64).unwrap(), v);
    }
    assert!(packed.ratio() > 0.0);
}

#[test]
fn construction_errors_propagate() {
    let words = [0u32; 2];
    assert!(RankDirectory::new(&words, 0).is_err());
    assert!(RankDirectory::new(&words, 100).is_err());
    assert!(CompactIntArray::new(&[1, 2], -1).is_err());
    assert!(BitContainer::new_fixed(-5).is_err());
}
