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

use std::fmt::Debug;

use scrollfeed_common::code::{Key, Value};

/// A cached media object together with its key.
///
/// Records are shared through `Arc`. The hard tier, the soft tier (as `Weak`) and every
/// outstanding [`crate::cache::CacheEntry`] point at the same record.
pub struct Record<K, V> {
    key: K,
    value: V,
}

impl<K, V> Debug for Record<K, V>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record").field("key", &self.key).finish()
    }
}

impl<K, V> Record<K, V>
where
    K: Key,
    V: Value,
{
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Media reference of the record.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Decoded media object of the record.
    pub fn value(&self) -> &V {
        &self.value
    }
}
