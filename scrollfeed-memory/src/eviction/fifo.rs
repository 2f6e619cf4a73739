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

/// Fifo eviction algorithm state.
#[derive(Debug)]
pub struct Fifo<K> {
    queue: OrderedQueue<K>,
}

impl<K> Default for Fifo<K> {
    fn default() -> Self {
        Self {
            queue: OrderedQueue::default(),
        }
    }
}

impl<K> Eviction<K> for Fifo<K>
where
    K: Key,
{
    fn push(&mut self, key: K) {
        self.queue.push_back(key);
    }

    fn access(&mut self, _: &K) {}

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

    #[test]
    fn test_fifo_ignores_access() {
        let mut fifo = Fifo::default();
        for i in 0..4u64 {
            fifo.push(i);
        }
        fifo.access(&0);
        fifo.remove(&2);
        assert_eq!(std::iter::from_fn(|| fifo.pop()).collect_vec(), vec![0, 1, 3]);
    }
}
