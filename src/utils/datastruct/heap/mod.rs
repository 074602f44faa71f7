use std::cmp::Ordering;

use crate::error::StructureError;

/// Binary max-heap over `(item, priority)` pairs.
///
/// Equal priorities come out in insertion order (first inserted, first
/// removed), so repeated runs over the same input give the same sequence.
#[derive(Debug, Clone)]
pub struct MaxPQ<T, P> {
    heap: Vec<Entry<T, P>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Entry<T, P> {
    item: T,
    priority: P,
    seq: u64,
}

impl<T, P: Ord> Entry<T, P> {
    /// greater means "comes out first"
    #[inline]
    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T, P: Ord> MaxPQ<T, P> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MaxPQ {
            heap: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, item: T, priority: P) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { item, priority, seq });
        self.swim(self.heap.len() - 1);
    }

    /// Item with the current maximum priority, without removing it.
    pub fn peek_max(&self) -> Option<(&T, &P)> {
        self.heap.first().map(|e| (&e.item, &e.priority))
    }

    /// Remove and return the item with the maximum priority.
    pub fn delete_max(&mut self) -> Result<(T, P), StructureError> {
        if self.heap.is_empty() {
            return Err(StructureError::EmptyQueue);
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let top = self.heap.pop().ok_or(StructureError::EmptyQueue)?;
        if !self.heap.is_empty() {
            self.sink(0);
        }
        Ok((top.item, top.priority))
    }

    /// Pop up to `k` items in priority order.
    pub fn take_top(&mut self, k: usize) -> Result<Vec<(T, P)>, StructureError> {
        let n = k.min(self.len());
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.delete_max()?);
        }
        Ok(out)
    }

    fn swim(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[parent].cmp_rank(&self.heap[i]) == Ordering::Less {
                self.heap.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sink(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < n && self.heap[left].cmp_rank(&self.heap[right]) == Ordering::Less {
                child = right;
            }
            if self.heap[i].cmp_rank(&self.heap[child]) != Ordering::Less {
                break;
            }
            self.heap.swap(i, child);
            i = child;
        }
    }
}

impl<T, P: Ord> Default for MaxPQ<T, P> {
    fn default() -> Self {
        Self::new()
    }
}
