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

use std::hash::Hash;

use hashbrown::{hash_map::Entry as HashMapEntry, Equivalent, HashMap};
use scrollfeed_common::code::Key;

/// Outcome of registering a listener for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// No fetch was in flight for the key. The caller must start one.
    Lead,
    /// A fetch is already in flight. The listener joined it.
    Wait,
}

/// Pending fetches: key to listeners in registration order.
///
/// The presence of a key means exactly one fetch for it is in flight.
#[derive(Debug)]
pub struct InflightMap<K, L> {
    inflights: HashMap<K, Vec<L>>,
}

impl<K, L> Default for InflightMap<K, L> {
    fn default() -> Self {
        Self {
            inflights: HashMap::new(),
        }
    }
}

impl<K, L> InflightMap<K, L>
where
    K: Key,
{
    /// Register `listener` for `key`.
    pub fn enqueue(&mut self, key: K, listener: L) -> Enqueue {
        match self.inflights.entry(key) {
            HashMapEntry::Occupied(mut o) => {
                o.get_mut().push(listener);
                Enqueue::Wait
            }
            HashMapEntry::Vacant(v) => {
                v.insert(vec![listener]);
                Enqueue::Lead
            }
        }
    }

    /// Clear the in-flight record of `key` and hand back its listeners.
    pub fn take<Q>(&mut self, key: &Q) -> Vec<L>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inflights.remove(key).unwrap_or_default()
    }

    /// Whether a fetch for `key` is in flight.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inflights.contains_key(key)
    }

    /// Number of keys with a fetch in flight.
    pub fn len(&self) -> usize {
        self.inflights.len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.inflights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_take() {
        let mut inflights = InflightMap::default();
        assert_eq!(inflights.enqueue("a".to_string(), 1), Enqueue::Lead);
        assert_eq!(inflights.enqueue("a".to_string(), 2), Enqueue::Wait);
        assert_eq!(inflights.enqueue("b".to_string(), 3), Enqueue::Lead);
        assert_eq!(inflights.len(), 2);

        assert_eq!(inflights.take("a"), vec![1, 2]);
        assert!(!inflights.contains("a"));
        assert!(inflights.take("a").is_empty());

        // A new request after completion leads again.
        assert_eq!(inflights.enqueue("a".to_string(), 4), Enqueue::Lead);
    }
}
