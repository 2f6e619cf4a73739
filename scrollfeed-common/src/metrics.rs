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

use metrics::{counter, gauge, Counter, Gauge};

/// Metric handles for one feed instance.
///
/// Handles are registered against whatever `metrics` recorder is installed when
/// [`Metrics::new`] is called. Without a recorder every handle is a no-op.
#[expect(missing_docs)]
#[derive(Clone)]
pub struct Metrics {
    /* media cache metrics */
    pub cache_insert: Counter,
    pub cache_replace: Counter,
    pub cache_hit: Counter,
    pub cache_miss: Counter,
    pub cache_evict: Counter,
    pub cache_remove: Counter,
    pub cache_reclaim: Counter,
    pub cache_soft_hit: Counter,

    pub cache_usage: Gauge,

    /* fetch coordinator metrics */
    pub fetch_start: Counter,
    pub fetch_join: Counter,
    pub fetch_ok: Counter,
    pub fetch_err: Counter,
    pub fetch_drop: Counter,

    /* feed metrics */
    pub feed_page_request: Counter,
    pub feed_page_loaded: Counter,
    pub feed_page_empty: Counter,
    pub feed_page_failed: Counter,
    pub feed_prune: Counter,

    pub feed_window_len: Gauge,
}

impl Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

impl Metrics {
    /// Register all handles labeled with `name`.
    pub fn new(name: &str) -> Self {
        /* media cache metrics */

        let cache_insert = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "insert");
        let cache_replace = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "replace");
        let cache_hit = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "hit");
        let cache_miss = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "miss");
        let cache_evict = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "evict");
        let cache_remove = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "remove");
        let cache_reclaim = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "reclaim");
        let cache_soft_hit = counter!("scrollfeed_cache_op_total", "name" => name.to_string(), "op" => "soft_hit");

        let cache_usage = gauge!("scrollfeed_cache_usage", "name" => name.to_string());

        /* fetch coordinator metrics */

        let fetch_start = counter!("scrollfeed_fetch_op_total", "name" => name.to_string(), "op" => "start");
        let fetch_join = counter!("scrollfeed_fetch_op_total", "name" => name.to_string(), "op" => "join");
        let fetch_ok = counter!("scrollfeed_fetch_op_total", "name" => name.to_string(), "op" => "ok");
        let fetch_err = counter!("scrollfeed_fetch_op_total", "name" => name.to_string(), "op" => "err");
        let fetch_drop = counter!("scrollfeed_fetch_op_total", "name" => name.to_string(), "op" => "drop");

        /* feed metrics */

        let feed_page_request =
            counter!("scrollfeed_feed_op_total", "name" => name.to_string(), "op" => "page_request");
        let feed_page_loaded = counter!("scrollfeed_feed_op_total", "name" => name.to_string(), "op" => "page_loaded");
        let feed_page_empty = counter!("scrollfeed_feed_op_total", "name" => name.to_string(), "op" => "page_empty");
        let feed_page_failed = counter!("scrollfeed_feed_op_total", "name" => name.to_string(), "op" => "page_failed");
        let feed_prune = counter!("scrollfeed_feed_op_total", "name" => name.to_string(), "op" => "prune");

        let feed_window_len = gauge!("scrollfeed_window_len", "name" => name.to_string());

        Self {
            cache_insert,
            cache_replace,
            cache_hit,
            cache_miss,
            cache_evict,
            cache_remove,
            cache_reclaim,
            cache_soft_hit,
            cache_usage,
            fetch_start,
            fetch_join,
            fetch_ok,
            fetch_err,
            fetch_drop,
            feed_page_request,
            feed_page_loaded,
            feed_page_empty,
            feed_page_failed,
            feed_prune,
            feed_window_len,
        }
    }

    /// Handles that are never registered anywhere.
    pub fn noop() -> Self {
        Self {
            cache_insert: Counter::noop(),
            cache_replace: Counter::noop(),
            cache_hit: Counter::noop(),
            cache_miss: Counter::noop(),
            cache_evict: Counter::noop(),
            cache_remove: Counter::noop(),
            cache_reclaim: Counter::noop(),
            cache_soft_hit: Counter::noop(),
            cache_usage: Gauge::noop(),
            fetch_start: Counter::noop(),
            fetch_join: Counter::noop(),
            fetch_ok: Counter::noop(),
            fetch_err: Counter::noop(),
            fetch_drop: Counter::noop(),
            feed_page_request: Counter::noop(),
            feed_page_loaded: Counter::noop(),
            feed_page_empty: Counter::noop(),
            feed_page_failed: Counter::noop(),
            feed_prune: Counter::noop(),
            feed_window_len: Gauge::noop(),
        }
    }
}
