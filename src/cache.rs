//! Per-transform memo table.
//!
//! A fixed number of slots, `2^bits`, each holding at most one `(key, value)`
//! pair. The slot of a key is picked from its [`MyHash`] value; the key itself
//! is stored and compared on lookup, so two keys landing in the same slot only
//! evict each other and never alias. A memo lives for the duration of a single
//! transform call and is dropped afterwards.

use crate::reference::NodeId;
use crate::utils::{pairing2, MyHash};

pub struct Cache<K, V> {
    slots: Vec<Option<(K, V)>>,
    mask: u64,
    hits: usize,
    misses: usize,
}

impl<K: MyHash + Eq + Copy, V: Copy> Cache<K, V> {
    /// Create an empty memo with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        let size = 1usize << bits;
        Self {
            slots: vec![None; size],
            mask: size as u64 - 1,
            hits: 0,
            misses: 0,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
    pub fn misses(&self) -> usize {
        self.misses
    }

    fn slot(&self, key: K) -> usize {
        (key.hash() & self.mask) as usize
    }

    /// The memoized value for `key`, if its slot still holds it.
    pub fn get(&mut self, key: K) -> Option<V> {
        let found = match self.slots[self.slot(key)] {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        };
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    /// Remember `value` for `key`, evicting whatever shared its slot.
    pub fn insert(&mut self, key: K, value: V) {
        let i = self.slot(key);
        self.slots[i] = Some((key, value));
    }
}

impl MyHash for NodeId {
    fn hash(&self) -> u64 {
        self.raw() as u64
    }
}

impl MyHash for (NodeId, u32) {
    fn hash(&self) -> u64 {
        pairing2(self.0.raw() as u64, self.1 as u64)
    }
}
