//! Tests for the multi-level bitmap frontier.

use super::*;
use crate::device::Queue;
use crate::types::WORD_BITS;

use proptest::prelude::*;

fn queue() -> Queue {
    Queue::with_geometry(4 * WORD_BITS.max(32), 32)
}

#[test]
fn test_insert_then_check() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 1000).unwrap();
    assert!(frontier.empty().unwrap());

    for x in [0, 1, 63, 64, 511, 999] {
        frontier.insert(x);
        assert!(frontier.check(x), "element {x}");
        assert!(!frontier.empty().unwrap());
    }
    assert!(!frontier.check(2));
    assert_eq!(frontier.count().unwrap(), 6);
}

#[test]
fn test_insert_is_idempotent() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 256).unwrap();
    frontier.insert(17);
    frontier.insert(17);
    assert_eq!(frontier.count().unwrap(), 1);

    frontier.remove(17);
    frontier.remove(17);
    assert!(!frontier.check(17));
    assert_eq!(frontier.count().unwrap(), 0);
}

#[test]
fn test_clear_empties_every_level() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 5000).unwrap();
    for x in (0..5000).step_by(97) {
        frontier.insert(x);
    }
    frontier.clear().unwrap();
    assert!(frontier.empty().unwrap());
    for x in (0..5000).step_by(97) {
        assert!(!frontier.check(x));
    }
    assert_eq!(frontier.compute_active_frontier().unwrap(), 0);
}

#[test]
fn test_level_consistency_after_insert() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 4096).unwrap();
    assert!(frontier.empty().unwrap());
    frontier.insert(4095);
    // The top level must summarize the set bit for the kernel-side
    // empty-check to see it.
    assert!(!frontier.empty().unwrap());
    frontier.clear().unwrap();
    assert!(frontier.empty().unwrap());
}

#[test]
fn test_domain_not_multiple_of_word_width() {
    let queue = queue();
    let n = WORD_BITS + WORD_BITS / 2;
    let frontier: MlbFrontier = MlbFrontier::new(&queue, n).unwrap();
    assert!(frontier.empty().unwrap());
    frontier.insert((n - 1) as u32);
    assert!(frontier.check((n - 1) as u32));
    assert_eq!(frontier.count().unwrap(), 1);
}

#[test]
#[should_panic(expected = "out of domain")]
fn test_insert_rejects_out_of_domain() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 10).unwrap();
    frontier.insert(10);
}

#[test]
fn test_compute_active_frontier_enumerates_words() {
    let queue = queue().with_compute_units(1);
    let n = WORD_BITS * WORD_BITS * 2;
    let frontier: MlbFrontier = MlbFrontier::new(&queue, n).unwrap();

    // One member in level-0 words 0, 3 and the last one.
    let members = [
        1,
        (3 * WORD_BITS + 5) as u32,
        (n - 1) as u32,
    ];
    for &x in &members {
        frontier.insert(x);
    }

    let count = frontier.compute_active_frontier().unwrap();
    assert_eq!(count, 3);
    let view = frontier.view();
    // A single compute unit claims workgroups in submission order, keeping
    // the materialized slices ascending.
    let offsets: Vec<u32> = (0..count).map(|slot| view.offset_at(slot)).collect();
    assert_eq!(offsets, vec![0, 3, (n / WORD_BITS - 1) as u32]);

    // Cached count is returned until a mutation invalidates it.
    assert_eq!(frontier.compute_active_frontier().unwrap(), 3);
    frontier.insert(2);
    assert_eq!(frontier.compute_active_frontier().unwrap(), 3);
}

#[test]
fn test_removed_words_stay_enumerated_but_unchecked() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 1024).unwrap();
    frontier.insert(5);
    frontier.remove(5);
    // Upper levels over-approximate; enumeration may include the word, but
    // the level-0 gate must reject the element.
    let count = frontier.compute_active_frontier().unwrap();
    assert!(count <= 1);
    assert!(!frontier.check(5));
}

#[test]
fn test_save_and_load_state_round_trip() {
    let queue = queue();
    let frontier: MlbFrontier = MlbFrontier::new(&queue, 2048).unwrap();
    for x in [0, 100, 1000, 2047] {
        frontier.insert(x);
    }
    let state = frontier.save_state();

    frontier.clear().unwrap();
    assert!(frontier.empty().unwrap());

    frontier.load_state(&state);
    assert!(!frontier.empty().unwrap());
    for x in [0, 100, 1000, 2047] {
        assert!(frontier.check(x), "element {x}");
    }
    assert_eq!(frontier.count().unwrap(), 4);
}

#[test]
fn test_swap_exchanges_membership() {
    let queue = queue();
    let mut a: MlbFrontier = MlbFrontier::new(&queue, 128).unwrap();
    let mut b: MlbFrontier = MlbFrontier::new(&queue, 128).unwrap();
    a.insert(7);
    b.insert(90);

    MlbFrontier::swap(&mut a, &mut b);
    assert!(a.check(90) && !a.check(7));
    assert!(b.check(7) && !b.check(90));
}

#[test]
fn test_merge_and_intersect() {
    let queue = queue();
    let a: MlbFrontier = MlbFrontier::new(&queue, 512).unwrap();
    let b: MlbFrontier = MlbFrontier::new(&queue, 512).unwrap();
    for x in [1, 2, 3] {
        a.insert(x);
    }
    for x in [3, 4] {
        b.insert(x);
    }

    a.merge(&b).unwrap();
    for x in [1, 2, 3, 4] {
        assert!(a.check(x), "element {x}");
    }

    a.intersect_with(&b).unwrap();
    assert!(a.check(3) && a.check(4));
    assert!(!a.check(1) && !a.check(2));
}

#[test]
fn test_concurrent_inserts_from_kernel() {
    let queue = queue();
    let n = 10_000;
    let frontier: MlbFrontier = MlbFrontier::new(&queue, n).unwrap();
    let view = frontier.view();
    let local = queue.work_group_size();
    queue
        .submit_work_groups(n.div_ceil(local), |group| {
            let base = group.id * local;
            for lane in 0..local {
                let x = base + lane;
                if x < n && x % 3 == 0 {
                    view.insert(x as u32);
                }
            }
        })
        .wait()
        .unwrap();
    assert_eq!(frontier.count().unwrap(), n.div_ceil(3));
}

proptest! {
    #[test]
    fn prop_membership_matches_reference(
        members in proptest::collection::btree_set(0u32..2000, 0..64),
    ) {
        let queue = queue();
        let frontier: MlbFrontier = MlbFrontier::new(&queue, 2000).unwrap();
        for &x in &members {
            frontier.insert(x);
        }
        prop_assert_eq!(frontier.count().unwrap(), members.len());
        for x in 0..2000u32 {
            prop_assert_eq!(frontier.check(x), members.contains(&x));
        }
        prop_assert_eq!(frontier.empty().unwrap(), members.is_empty());
    }

    #[test]
    fn prop_save_clear_load_restores(
        members in proptest::collection::btree_set(0u32..4096, 0..128),
    ) {
        let queue = queue();
        let frontier: MlbFrontier = MlbFrontier::new(&queue, 4096).unwrap();
        for &x in &members {
            frontier.insert(x);
        }
        let state = frontier.save_state();
        frontier.clear().unwrap();
        frontier.load_state(&state);
        for &x in &members {
            prop_assert!(frontier.check(x));
        }
        prop_assert_eq!(frontier.count().unwrap(), members.len());
    }
}
