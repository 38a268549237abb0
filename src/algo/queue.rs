use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::VertexId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    key: i64,
    seq: u64,
    vertex: VertexId,
    slot: usize,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap keyed by (key, insertion order). Decrease-key is a
/// re-insert; superseded entries are rejected by `is_stale` on pop.
#[derive(Debug, Default, Clone)]
pub struct CandidateQueue {
    heap: BinaryHeap<QueueEntry>,
    seq: u64,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vertex: VertexId, slot: usize, key: i64) {
        self.seq += 1;
        self.heap.push(QueueEntry {
            key,
            seq: self.seq,
            vertex,
            slot,
        });
    }

    pub fn pop_min<F>(&mut self, mut is_stale: F) -> Option<(VertexId, usize, i64)>
    where
        F: FnMut(VertexId, usize, i64) -> bool,
    {
        while let Some(entry) = self.heap.pop() {
            if is_stale(entry.vertex, entry.slot, entry.key) {
                continue;
            }
            return Some((entry.vertex, entry.slot, entry.key));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_key_then_insertion_order() {
        let mut queue = CandidateQueue::new();
        queue.push(1, 0, 5);
        queue.push(2, 0, 3);
        queue.push(3, 0, 3);

        assert_eq!(queue.pop_min(|_, _, _| false), Some((2, 0, 3)));
        assert_eq!(queue.pop_min(|_, _, _| false), Some((3, 0, 3)));
        assert_eq!(queue.pop_min(|_, _, _| false), Some((1, 0, 5)));
        assert_eq!(queue.pop_min(|_, _, _| false), None);
    }

    #[test]
    fn reinsert_supersedes_stale_entries() {
        let mut queue = CandidateQueue::new();
        queue.push(1, 0, 10);
        queue.push(1, 0, 4);

        let current_key = 4;
        let popped = queue.pop_min(|_, _, key| key != current_key);
        assert_eq!(popped, Some((1, 0, 4)));
        assert_eq!(queue.pop_min(|_, _, key| key != current_key), None);
    }
}
