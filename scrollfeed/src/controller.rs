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
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use scrollfeed_common::{
    code::Value,
    error::{Error, ErrorKind, Result},
    metrics::Metrics,
    strict_assert, strict_assert_eq,
};
use scrollfeed_memory::{Fetch, FetchCoordinator, FetchResult};

use crate::{
    config::{FeedConfig, PagePolicy},
    cursor::PageCursor,
    item::ContentItem,
    media::{MediaLoader, MediaState},
    provider::ContentProvider,
    renderer::Renderer,
    trigger::{LoadTrigger, ScrollPosition},
    window::{FeedWindow, SlotId},
};

/// Worker outcomes handed back to the presentation context.
enum FeedEvent<M> {
    Page {
        index: usize,
        result: Result<Vec<ContentItem>>,
    },
    Media {
        slot: SlotId,
        result: FetchResult<String, M>,
    },
}

pub(crate) struct FeedParts<M, R> {
    pub name: String,
    pub config: FeedConfig,
    pub provider: Arc<dyn ContentProvider>,
    pub loader: Arc<dyn MediaLoader<M>>,
    pub renderer: R,
    pub trigger: Box<dyn LoadTrigger>,
    pub fetcher: FetchCoordinator<String, M>,
    pub metrics: Arc<Metrics>,
}

/// Owner of the feed window, driven from a single presentation context.
///
/// Page requests and media fetches run on the worker pool. Their outcomes are queued and only
/// applied to the window by [`FeedController::poll_events`], [`FeedController::wait_events`]
/// or [`FeedController::wait_idle`], so the window and the renderer are only ever touched
/// from the thread that owns the controller.
///
/// The window never holds more than `retention_limit` entries: every append is followed by a
/// prune of the oldest entries.
pub struct FeedController<M, R>
where
    M: Value,
    R: Renderer<M>,
{
    name: String,
    config: FeedConfig,
    provider: Arc<dyn ContentProvider>,
    loader: Arc<dyn MediaLoader<M>>,
    renderer: R,
    trigger: Box<dyn LoadTrigger>,
    fetcher: FetchCoordinator<String, M>,
    window: FeedWindow<M, R::Handle>,
    cursor: PageCursor,
    /// Media listeners registered by this controller that have not reported back yet.
    pending_media: usize,
    tx: flume::Sender<FeedEvent<M>>,
    rx: flume::Receiver<FeedEvent<M>>,
    metrics: Arc<Metrics>,
}

impl<M, R> Debug for FeedController<M, R>
where
    M: Value,
    R: Renderer<M>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("cursor", &self.cursor)
            .field("len", &self.window.len())
            .field("pending_media", &self.pending_media)
            .finish()
    }
}

impl<M, R> FeedController<M, R>
where
    M: Value,
    R: Renderer<M>,
{
    pub(crate) fn new(parts: FeedParts<M, R>) -> Self {
        let (tx, rx) = flume::unbounded();
        tracing::info!(
            "[feed]: {} created with page size {}, retention limit {}, cache capacity {}",
            parts.name,
            parts.config.page_size,
            parts.config.retention_limit,
            parts.fetcher.cache().capacity()
        );
        Self {
            name: parts.name,
            config: parts.config,
            provider: parts.provider,
            loader: parts.loader,
            renderer: parts.renderer,
            trigger: parts.trigger,
            fetcher: parts.fetcher,
            window: FeedWindow::default(),
            cursor: PageCursor::default(),
            pending_media: 0,
            tx,
            rx,
            metrics: parts.metrics,
        }
    }

    /// Request the next page unless a request is outstanding or the feed is exhausted.
    ///
    /// Returns whether a request was dispatched. The page is applied when events are pumped.
    pub fn request_more(&mut self) -> bool {
        let Some(index) = self.cursor.begin() else {
            tracing::trace!("[feed]: {} skip page request in state {:?}", self.name, self.cursor.state());
            return false;
        };

        tracing::debug!("[feed]: {} request page {index}", self.name);
        self.metrics.feed_page_request.increment(1);

        let provider = self.provider.clone();
        let page_size = self.config.page_size;
        let tx = self.tx.clone();
        self.fetcher.pool().execute(
            move || provider.fetch_page(index, page_size),
            move |res| {
                let _ = tx.send(FeedEvent::Page {
                    index,
                    result: res.and_then(|page| page),
                });
            },
        );
        true
    }

    /// Report new scroll geometry. Requests the next page if the load trigger fires.
    ///
    /// Returns whether a request was dispatched. The trigger is not consulted while a request
    /// is outstanding or after the feed is exhausted.
    pub fn scroll_proximity_changed(&mut self, position: &ScrollPosition) -> bool {
        if !self.cursor.can_request() {
            return false;
        }
        if self.trigger.should_load(position, self.window.len()) {
            self.request_more()
        } else {
            false
        }
    }

    /// Drop the oldest entries until the window fits the retention limit.
    ///
    /// Returns the number of entries dropped. In-flight media fetches of dropped entries are
    /// left running; their outcomes are ignored.
    pub fn prune_if_needed(&mut self) -> usize {
        let limit = self.config.retention_limit;
        let mut pruned = 0;
        while self.window.len() > limit {
            let Some(entry) = self.window.pop_front() else {
                break;
            };
            self.renderer.dematerialize(entry.into_handle());
            pruned += 1;
        }
        strict_assert!(self.window.len() <= limit);

        if pruned > 0 {
            tracing::debug!("[feed]: {} pruned {pruned} entries", self.name);
            self.metrics.feed_prune.increment(pruned as u64);
            self.metrics.feed_window_len.set(self.window.len() as f64);
        }
        pruned
    }

    /// Replace the window with `items`, newest first, trimmed to the retention limit.
    ///
    /// The page cursor is left untouched.
    pub fn seed(&mut self, items: Vec<ContentItem>) {
        tracing::debug!("[feed]: {} seeded with {} items", self.name, items.len());
        self.clear_window();
        self.append(items);
        self.prune_if_needed();
    }

    /// Apply every queued worker outcome without blocking. Returns how many were applied.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for a worker outcome, then apply everything queued.
    pub fn wait_events(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                1 + self.poll_events()
            }
            Err(_) => 0,
        }
    }

    /// Pump events until no page request and no media fetch of this feed is outstanding.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll_events();
            if self.is_idle() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_events(deadline - now);
        }
    }

    /// Whether no page request and no media fetch of this feed is outstanding.
    pub fn is_idle(&self) -> bool {
        !self.cursor.is_loading() && self.pending_media == 0
    }

    /// The live window, oldest entry first.
    pub fn window(&self) -> &FeedWindow<M, R::Handle> {
        &self.window
    }

    /// The page cursor.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// The validated configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Media fetch coordinator, shared with the media cache.
    pub fn fetcher(&self) -> &FetchCoordinator<String, M> {
        &self.fetcher
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The feed name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window holds no entry.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn apply(&mut self, event: FeedEvent<M>) {
        match event {
            FeedEvent::Page { index, result } => self.on_page(index, result),
            FeedEvent::Media { slot, result } => self.on_media(slot, result),
        }
    }

    fn on_page(&mut self, index: usize, result: Result<Vec<ContentItem>>) {
        strict_assert!(self.cursor.is_loading());
        strict_assert_eq!(index, self.cursor.next_page_index());

        match result {
            Ok(items) if items.is_empty() => {
                tracing::debug!("[feed]: {} page {index} is empty, feed exhausted", self.name);
                self.metrics.feed_page_empty.increment(1);
                self.cursor.exhaust();
            }
            Ok(items) => {
                tracing::debug!("[feed]: {} page {index} loaded with {} items", self.name, items.len());
                self.metrics.feed_page_loaded.increment(1);
                self.append(items);
                self.cursor.advance();
                self.prune_if_needed();
            }
            Err(e) => {
                self.metrics.feed_page_failed.increment(1);
                match self.config.page_failure {
                    PagePolicy::Exhaust => {
                        tracing::warn!("[feed]: {} page {index} failed, feed exhausted: {e}", self.name);
                        self.cursor.exhaust();
                    }
                    PagePolicy::Retry => {
                        tracing::warn!("[feed]: {} page {index} failed, will retry: {e}", self.name);
                        self.cursor.fail();
                    }
                }
            }
        }
    }

    fn on_media(&mut self, slot: SlotId, result: FetchResult<String, M>) {
        self.pending_media = self.pending_media.saturating_sub(1);

        let Some(entry) = self.window.get_mut(slot) else {
            tracing::trace!("[feed]: {} media for pruned slot {slot:?} ignored", self.name);
            return;
        };

        let state = match result {
            Ok(media) => MediaState::Ready(media),
            Err(e) => {
                tracing::warn!("[feed]: {} media of {:?} failed: {e}", self.name, entry.item().media_ref());
                MediaState::Failed(e)
            }
        };

        let (handle, item, media) = entry.parts_mut();
        let media = media.insert(state);
        self.renderer.refresh(handle, item, media);
    }

    /// Materialize `items` at the tail. The first items of an empty window are sorted newest
    /// first; later ones keep their arrival order.
    fn append(&mut self, mut items: Vec<ContentItem>) {
        if self.window.is_empty() {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        for item in items {
            let slot = self.window.next_slot();
            let media = item.media_ref().map(|media_ref| self.media_state(slot, media_ref));
            let handle = self.renderer.materialize(&item, media.as_ref());
            self.window.push_back(item, media, handle);
        }
        self.metrics.feed_window_len.set(self.window.len() as f64);
    }

    /// Resolve the initial media state of the entry at `slot`, starting a fetch on a miss.
    fn media_state(&mut self, slot: SlotId, media_ref: &str) -> MediaState<M> {
        if media_ref.is_empty() {
            return MediaState::Failed(Error::new(ErrorKind::Fetch, "media reference missing"));
        }

        let loader = self.loader.clone();
        let key = media_ref.to_string();
        let tx = self.tx.clone();
        let fetch = self.fetcher.fetch(
            key.clone(),
            move || loader.load(&key),
            move |result| {
                let _ = tx.send(FeedEvent::Media { slot, result });
            },
        );

        match fetch {
            Fetch::Hit(entry) => MediaState::Ready(entry),
            Fetch::Started | Fetch::Joined => {
                self.pending_media += 1;
                MediaState::Loading
            }
        }
    }

    fn clear_window(&mut self) {
        for entry in self.window.drain() {
            self.renderer.dematerialize(entry.into_handle());
        }
        self.metrics.feed_window_len.set(0.0);
    }
}

impl<M, R> Drop for FeedController<M, R>
where
    M: Value,
    R: Renderer<M>,
{
    fn drop(&mut self) {
        self.clear_window();
        self.fetcher.close();
        tracing::debug!("[feed]: {} torn down", self.name);
    }
}
