//! Fixed-capacity, insertion-ordered ring of the most recent decoded
//! messages (spec §4.7).
//!
//! One writer (the consumer task draining the scanner/classifier
//! pipeline) and any number of readers (a renderer, a status
//! endpoint) share a [RecentMessageRing] through `Clone`; every clone
//! points at the same backing storage.

use crate::message::Message;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Default ring capacity, per spec §8 scenario 5.
pub const DEFAULT_CAPACITY: usize = 20;

/// FIFO-on-overflow ring of the last `capacity` [Message]s.
#[derive(Debug, Clone)]
pub struct RecentMessageRing {
    inner: Arc<RwLock<VecDeque<Message>>>,
    capacity: usize,
}

impl RecentMessageRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Appends `message`, evicting the oldest entry first if the ring
    /// is already at capacity.
    pub fn insert(&self, message: Message) {
        let mut guard = self.inner.write().expect("ring lock poisoned");
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(message);
    }

    /// A point-in-time copy, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner
            .read()
            .expect("ring lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("ring lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentMessageRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(n: u8) -> Message {
        Message::non_rtcm(vec![n])
    }

    #[test]
    fn holds_up_to_capacity() {
        let ring = RecentMessageRing::new(3);
        ring.insert(tagged(1));
        ring.insert(tagged(2));
        ring.insert(tagged(3));
        assert_eq!(ring.len(), 3);
        let snapshot = ring.snapshot();
        assert_eq!(snapshot[0].raw_data, vec![1]);
        assert_eq!(snapshot[2].raw_data, vec![3]);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let ring = RecentMessageRing::new(20);
        for i in 0..25u8 {
            ring.insert(tagged(i));
        }
        assert_eq!(ring.len(), 20);
        let snapshot = ring.snapshot();
        assert_eq!(snapshot.first().unwrap().raw_data, vec![5]);
        assert_eq!(snapshot.last().unwrap().raw_data, vec![24]);
    }

    #[test]
    fn clones_share_backing_storage() {
        let ring = RecentMessageRing::new(5);
        let handle = ring.clone();
        ring.insert(tagged(1));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn default_capacity_matches_spec() {
        let ring = RecentMessageRing::default();
        assert_eq!(ring.capacity(), 20);
    }
}
