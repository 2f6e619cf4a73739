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

use serde::{Deserialize, Serialize};

use scrollfeed_common::code::Key;

/// Eviction order bookkeeping for the media cache.
///
/// The cache owns the entries; an eviction policy only tracks keys and picks victims.
/// All methods are called with the cache lock held.
pub trait Eviction<K>: Send + Sync + 'static {
    /// A new key was inserted.
    fn push(&mut self, key: K);
    /// An existing key was read.
    fn access(&mut self, key: &K);
    /// A key left the cache for a reason other than [`Eviction::pop`].
    fn remove(&mut self, key: &K);
    /// Pick and forget the next victim.
    fn pop(&mut self) -> Option<K>;
    /// Forget all keys.
    fn clear(&mut self);
    /// Number of tracked keys.
    fn len(&self) -> usize;
    /// Whether no key is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Eviction algorithm selection for the media cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionConfig {
    /// Least recently used entry goes first. Both reads and writes refresh recency.
    #[default]
    Lru,
    /// First inserted entry goes first. Reads do not refresh anything.
    Fifo,
}

impl EvictionConfig {
    pub(crate) fn build<K>(self) -> Box<dyn Eviction<K>>
    where
        K: Key,
    {
        match self {
            EvictionConfig::Lru => Box::new(lru::Lru::default()),
            EvictionConfig::Fifo => Box::new(fifo::Fifo::default()),
        }
    }
}

pub mod fifo;
pub mod lru;
pub mod queue;
