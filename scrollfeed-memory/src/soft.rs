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

use std::{
    hash::Hash,
    sync::{Arc, Weak},
};

use hashbrown::{Equivalent, HashMap};
use scrollfeed_common::code::{Key, Value};

use crate::{eviction::queue::OrderedQueue, record::Record};

/// Weakly held records that left the hard tier.
///
/// A record in here costs nothing unless some display entry still holds a strong reference.
/// Lookups that can still upgrade the reference get the record back; dead references are
/// forgotten on lookup or when the tier overflows.
pub(crate) struct SoftTier<K, V> {
    refs: HashMap<K, Weak<Record<K, V>>>,
    order: OrderedQueue<K>,
    capacity: usize,
}

impl<K, V> SoftTier<K, V>
where
    K: Key,
    V: Value,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            refs: HashMap::new(),
            order: OrderedQueue::default(),
            capacity,
        }
    }

    /// Remember `record` weakly, forgetting the oldest remembered records past capacity.
    pub fn insert(&mut self, record: &Arc<Record<K, V>>) {
        self.refs.insert(record.key().clone(), Arc::downgrade(record));
        self.order.push_back(record.key().clone());
        while self.order.len() > self.capacity {
            match self.order.pop_front() {
                Some(key) => {
                    self.refs.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Take the record out of the tier if it is still alive.
    pub fn upgrade<Q>(&mut self, key: &Q) -> Option<Arc<Record<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let weak = self.refs.remove(key)?;
        self.order.remove(key);
        weak.upgrade()
    }

    pub fn remove<Q>(&mut self, key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        if self.refs.remove(key).is_some() {
            self.order.remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.refs.clear();
        self.order.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.refs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_tier_upgrade() {
        let mut soft = SoftTier::new(2);

        let alive = Arc::new(Record::new(1u64, "alive".to_string()));
        soft.insert(&alive);
        soft.insert(&Arc::new(Record::new(2u64, "dead".to_string())));
        assert_eq!(soft.len(), 2);

        assert!(soft.upgrade(&2).is_none());
        let record = soft.upgrade(&1).unwrap();
        assert!(Arc::ptr_eq(&record, &alive));
        assert_eq!(soft.len(), 0);
    }

    #[test]
    fn test_soft_tier_bounded() {
        let mut soft = SoftTier::new(2);
        let records = (0..4u64)
            .map(|i| Arc::new(Record::new(i, i)))
            .collect::<Vec<_>>();
        for record in &records {
            soft.insert(record);
        }
        assert_eq!(soft.len(), 2);
        assert!(soft.upgrade(&0).is_none());
        assert!(soft.upgrade(&1).is_none());
        assert!(soft.upgrade(&3).is_some());
    }
}
