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

pub use scrollfeed_common as common;
pub use scrollfeed_common::{
    error::{Error, ErrorKind, Result},
    event::{Event, EventListener},
    metrics::Metrics,
    pool::WorkerPool,
    spawn::Spawner,
};
pub use scrollfeed_memory as memory;
pub use scrollfeed_memory::{
    CacheBuilder, CacheEntry, EvictionConfig, Fetch, FetchCoordinator, FetchResult, MediaCache, Request,
};

pub use crate::{
    builder::FeedBuilder,
    config::{FeedConfig, PagePolicy},
    controller::FeedController,
    cursor::{CursorState, PageCursor},
    item::{ContentItem, ContentKind},
    media::{MediaLoader, MediaState},
    provider::{sample_feed, ContentProvider, StaticProvider, SyntheticProvider},
    renderer::Renderer,
    trigger::{FractionTrigger, IntervalTrigger, LoadTrigger, RemainingTrigger, ScrollPosition},
    window::{FeedEntry, FeedWindow, SlotId},
};
