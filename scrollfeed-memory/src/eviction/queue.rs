// Copyright 2026 scrollfeed Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{collections::BTreeMap, hash::Hash};

use hashbrown::{Equivalent, HashMap};
use scrollfeed_common::{code::Key, strict_assert_eq};

/// Keys ordered by a monotonic tick, oldest first.
///
/// Every push takes a fresh tick, so two keys never share a position and the first pushed
/// among otherwise equal keys is always the first popped.
#[derive(Debug)]
pub struct OrderedQueue<K> {
    queue: BTreeMap<u64, K>,
    ticks: HashMap<K, u64>,
    next: u64,
}

impl<K> Default for OrderedQueue<K> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            ticks: HashMap::new(),
            next: 0,
        }
    }
}

impl<K> OrderedQueue<K>
where
    K: Key,
{
    /// Push `key` to the back, moving it there if it is already queued.
    pub fn push_back(&mut self, key: K) {
        let tick = self.tick();
        if let Some(old) = self.ticks.insert(key.clone(), tick) {
            self.queue.remove(&old);
        }
        self.queue.insert(tick, key);
        strict_assert_eq!(self.queue.len(), self.ticks.len());
    }

    /// Move `key` to the back if it is queued. Returns whether it was.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let tick = self.next;
        let Some(slot) = self.ticks.get_mut(key) else {
            return false;
        };
        let old = std::mem::replace(slot, tick);
        self.next += 1;
        if let Some(k) = self.queue.remove(&old) {
            self.queue.insert(tick, k);
        }
        true
    }

    /// Remove `key`. Returns whether it was queued.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        match self.ticks.remove(key) {
            Some(tick) => {
                self.queue.remove(&tick);
                true
            }
            None => false,
        }
    }

    /// Pop the oldest key.
    pub fn pop_front(&mut self) -> Option<K> {
        let (_, key) = self.queue.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Peek the oldest key.
    pub fn front(&self) -> Option<&K> {
        self.queue.first_key_value().map(|(_, k)| k)
    }

    /// Iterate keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.queue.values()
    }

    /// Number of queued keys.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop all keys.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.ticks.clear();
    }

    fn tick(&mut self) -> u64 {
        let tick = self.next;
        self.next += 1;
        tick
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_queue_order() {
        let mut q = OrderedQueue::default();
        for i in 0..5u64 {
            q.push_back(i);
        }
        assert_eq!(q.iter().copied().collect_vec(), vec![0, 1, 2, 3, 4]);

        assert!(q.touch(&1));
        assert!(!q.touch(&42));
        q.push_back(3);
        assert_eq!(q.iter().copied().collect_vec(), vec![0, 2, 4, 1, 3]);

        assert!(q.remove(&4));
        assert!(!q.remove(&4));
        assert_eq!(q.front(), Some(&0));
        assert_eq!(q.pop_front(), Some(0));
        assert_eq!(q.pop_front(), Some(2));
        assert_eq!(q.len(), 2);

        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn test_queue_borrowed_lookup() {
        let mut q = OrderedQueue::default();
        q.push_back("a".to_string());
        q.push_back("b".to_string());
        assert!(q.touch("a"));
        assert!(q.remove("b"));
        assert_eq!(q.iter().map(String::as_str).collect_vec(), vec!["a"]);
    }
}
