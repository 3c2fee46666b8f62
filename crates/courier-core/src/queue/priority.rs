//! Bounded priority queue: higher priority first, FIFO among equals.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry. `seq` increases with every push so equal priorities pop in
/// enqueue order.
#[derive(Debug)]
struct Entry<T> {
    priority: i32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on priority; lower seq (older) wins ties.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Push an item. Hands it back when the queue is full.
    pub fn push(&mut self, priority: i32, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { priority, seq, item });
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_pops_first() {
        let mut q = PriorityQueue::new(8);
        q.push(3, "low").unwrap();
        q.push(9, "high").unwrap();
        q.push(5, "mid").unwrap();

        assert_eq!(q.pop(), Some("high"));
        assert_eq!(q.pop(), Some("mid"));
        assert_eq!(q.pop(), Some("low"));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn equal_priorities_keep_enqueue_order() {
        let mut q = PriorityQueue::new(8);
        for n in 0..5 {
            q.push(4, n).unwrap();
        }
        q.push(7, 99).unwrap();

        let drained: Vec<i32> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(drained, vec![99, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_queue_hands_the_item_back() {
        let mut q = PriorityQueue::new(2);
        q.push(1, 'a').unwrap();
        q.push(1, 'b').unwrap();

        assert!(q.is_full());
        assert_eq!(q.push(10, 'c'), Err('c'));
        assert_eq!(q.len(), 2);

        q.pop();
        assert!(q.push(10, 'c').is_ok());
    }
}
