use crate::graph::NodeId;
use crate::model::INFINITE_COST;

/// Binary min-heap over node ids with decrease-key support.
///
/// A position map makes decrease-key O(log n) without searching: slot 0 in
/// the map means the node is absent, either never inserted or already
/// extracted. Extracted nodes stay absent until `clear`.
pub struct DecreaseKeyHeap {
    heap: Vec<NodeId>,
    /// Node id -> heap index + 1; 0 means "not enqueued".
    loc: Vec<usize>,
    key: Vec<i64>,
}

impl DecreaseKeyHeap {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            heap: Vec::with_capacity(n),
            loc: vec![0; n],
            key: vec![INFINITE_COST; n],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.loc[id] != 0
    }

    pub fn key(&self, id: NodeId) -> i64 {
        self.key[id]
    }

    /// Appends `id` without restoring heap order. Valid only when `key` is no
    /// smaller than every key already in the heap, which holds for the bulk
    /// initialization pattern of inserting everything at the infinite
    /// sentinel before any decrease.
    pub fn lazy_insert(&mut self, id: NodeId, key: i64) {
        debug_assert_eq!(self.loc[id], 0, "node {id} is already enqueued");
        self.key[id] = key;
        self.heap.push(id);
        self.loc[id] = self.heap.len();
    }

    /// Lowers the key of an enqueued node and restores heap order upward.
    pub fn decrease_key(&mut self, id: NodeId, key: i64) {
        debug_assert_ne!(self.loc[id], 0, "node {id} is not enqueued");
        debug_assert!(key <= self.key[id], "keys may only decrease");
        self.key[id] = key;
        self.sift_up(self.loc[id] - 1);
    }

    /// Removes and returns the node with the smallest key.
    pub fn pop_min(&mut self) -> Option<NodeId> {
        let min = *self.heap.first()?;
        let last = self.heap.pop().filter(|_| !self.heap.is_empty());
        if let Some(last) = last {
            self.heap[0] = last;
            self.loc[last] = 1;
            self.sift_down(0);
        }
        self.loc[min] = 0;
        Some(min)
    }

    pub fn clear(&mut self) {
        for &id in &self.heap {
            self.loc[id] = 0;
        }
        self.heap.clear();
        self.key.fill(INFINITE_COST);
    }

    fn sift_up(&mut self, mut i: usize) {
        let id = self.heap[i];
        let key = self.key[id];
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.key[self.heap[parent]] <= key {
                break;
            }
            self.heap[i] = self.heap[parent];
            self.loc[self.heap[i]] = i + 1;
            i = parent;
        }
        self.heap[i] = id;
        self.loc[id] = i + 1;
    }

    fn sift_down(&mut self, mut i: usize) {
        let id = self.heap[i];
        let key = self.key[id];
        loop {
            let mut child = 2 * i + 1;
            if child >= self.heap.len() {
                break;
            }
            if child + 1 < self.heap.len()
                && self.key[self.heap[child + 1]] < self.key[self.heap[child]]
            {
                child += 1;
            }
            if self.key[self.heap[child]] >= key {
                break;
            }
            self.heap[i] = self.heap[child];
            self.loc[self.heap[i]] = i + 1;
            i = child;
        }
        self.heap[i] = id;
        self.loc[id] = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::DecreaseKeyHeap;
    use crate::model::INFINITE_COST;

    #[test]
    fn pop_min_returns_ids_in_key_order() {
        let mut heap = DecreaseKeyHeap::with_capacity(4);
        for id in 0..4 {
            heap.lazy_insert(id, INFINITE_COST);
        }
        heap.decrease_key(2, 5);
        heap.decrease_key(0, 9);
        heap.decrease_key(3, 1);
        assert_eq!(heap.pop_min(), Some(3));
        assert_eq!(heap.pop_min(), Some(2));
        assert_eq!(heap.pop_min(), Some(0));
        assert_eq!(heap.pop_min(), Some(1));
        assert_eq!(heap.pop_min(), None);
    }

    #[test]
    fn decrease_key_moves_node_ahead() {
        let mut heap = DecreaseKeyHeap::with_capacity(3);
        heap.lazy_insert(0, 10);
        heap.lazy_insert(1, 20);
        heap.lazy_insert(2, 30);
        heap.decrease_key(2, 1);
        assert_eq!(heap.pop_min(), Some(2));
    }

    #[test]
    fn contains_reflects_membership_and_extraction() {
        let mut heap = DecreaseKeyHeap::with_capacity(2);
        assert!(!heap.contains(0));
        heap.lazy_insert(0, 7);
        assert!(heap.contains(0));
        assert_eq!(heap.pop_min(), Some(0));
        assert!(!heap.contains(0));
    }

    #[test]
    fn clear_resets_membership_and_keys() {
        let mut heap = DecreaseKeyHeap::with_capacity(3);
        heap.lazy_insert(1, 4);
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(1));
        assert_eq!(heap.key(1), INFINITE_COST);
        heap.lazy_insert(1, 2);
        assert_eq!(heap.pop_min(), Some(1));
    }
}
