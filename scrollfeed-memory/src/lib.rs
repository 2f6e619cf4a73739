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

//! In-memory media cache and fetch coordination for scrollfeed.
//!
//! [`MediaCache`] keeps a bounded set of decoded media objects ordered by recency.
//! [`FetchCoordinator`] runs media producers on a worker pool, collapses concurrent requests
//! for the same media reference into one fetch and publishes the result into the cache.

mod cache;
mod eviction;
mod fetch;
mod inflight;
mod prelude;
mod record;
mod soft;

pub use prelude::*;
