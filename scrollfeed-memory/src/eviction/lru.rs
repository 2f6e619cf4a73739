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

use scrollfeed_common::code::Key;

use super::{queue::OrderedQueue, Eviction};

/// Lru eviction algorithm state.
#[derive(Debug)]
pub struct Lru<K> {
    queue: OrderedQueue<K>,
}

impl<K> Default for Lru<K> {
    fn default() -> Self {
        Self {
            queue: OrderedQueue::default(),
        }
    }
}

impl<K> Eviction<K> for Lru<K>
where
    K: Key,
{
    fn push(&mut self, key: K) {
        self.queue.push_back(key);
    }

    fn access(&mut self, key: &K) {
        self.queue.touch(key);
    }

    fn remove(&mut self, key: &K) {
        self.queue.remove(key);
    }

    fn pop(&mut self) -> Option<K> {
        self.queue.pop_front()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn drain(lru: &mut Lru<u64>) -> Vec<u64> {
        std::iter::from_fn(|| lru.pop()).collect_vec()
    }

    #[test]
    fn test_lru() {
        let mut lru = Lru::default();
        for i in 0..8 {
            lru.push(i);
        }
        lru.access(&2);
        lru.access(&0);
        lru.remove(&5);
        // Unknown keys are ignored.
        lru.access(&100);
        lru.remove(&100);

        assert_eq!(lru.len(), 7);
        assert_eq!(drain(&mut lru), vec![1, 3, 4, 6, 7, 2, 0]);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_reinsert_refreshes() {
        let mut lru = Lru::default();
        lru.push(1);
        lru.push(2);
        lru.push(1);
        assert_eq!(lru.len(), 2);
        assert_eq!(drain(&mut lru), vec![2, 1]);
    }
}
