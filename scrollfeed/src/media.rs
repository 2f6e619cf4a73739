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

use scrollfeed_common::error::{Error, Result};
use scrollfeed_memory::CacheEntry;

/// Fetches and decodes the media behind a media reference.
///
/// Runs on a worker thread only and may block. `Ok(None)` means the reference resolved to
/// nothing and is reported as a failure.
pub trait MediaLoader<M>: Send + Sync + 'static {
    /// Load the media of `media_ref`.
    fn load(&self, media_ref: &str) -> Result<Option<M>>;
}

impl<M, F> MediaLoader<M> for F
where
    F: Fn(&str) -> Result<Option<M>> + Send + Sync + 'static,
{
    fn load(&self, media_ref: &str) -> Result<Option<M>> {
        self(media_ref)
    }
}

/// Display state of the media of one feed entry.
#[derive(Debug)]
pub enum MediaState<M> {
    /// A fetch is in flight.
    Loading,
    /// The decoded media, shared with the media cache.
    Ready(CacheEntry<String, M>),
    /// The fetch failed or the item has no usable media reference.
    Failed(Error),
}

impl<M> Clone for MediaState<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Ready(entry) => Self::Ready(entry.clone()),
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

impl<M> MediaState<M> {
    /// Whether the fetch is still running.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the media is available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Whether the fetch failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
