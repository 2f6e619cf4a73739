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

use chrono::{DateTime, Duration, Utc};
use scrollfeed_common::error::Result;

use crate::item::ContentItem;

/// Source of feed pages.
///
/// Called on a worker thread only. An empty page means there is no more data. Implementations
/// should be idempotent: the same `(page_index, page_size)` yields the same page.
pub trait ContentProvider: Send + Sync + 'static {
    /// Fetch items `[page_index * page_size, (page_index + 1) * page_size)`.
    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ContentItem>>;
}

impl<F> ContentProvider for F
where
    F: Fn(usize, usize) -> Result<Vec<ContentItem>> + Send + Sync + 'static,
{
    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ContentItem>> {
        self(page_index, page_size)
    }
}

/// Half-open item range of a page within `total` items, `None` past the end.
fn page_range(page_index: usize, page_size: usize, total: usize) -> Option<std::ops::Range<usize>> {
    if page_size == 0 {
        return None;
    }
    let start = page_index.checked_mul(page_size)?;
    if start >= total {
        return None;
    }
    Some(start..start.saturating_add(page_size).min(total))
}

/// Deterministic generator of `total` mixed items.
///
/// Item `i` is authored by `user{i}` and created `i` minutes before the anchor, so the feed is
/// newest first. Every six items hold two photos, two videos and two text posts.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    total: usize,
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    /// Generate `total` items anchored at the current time.
    pub fn new(total: usize) -> Self {
        Self::with_anchor(total, Utc::now())
    }

    /// Generate `total` items anchored at `anchor`.
    pub fn with_anchor(total: usize, anchor: DateTime<Utc>) -> Self {
        Self { total, anchor }
    }

    /// Number of items the provider serves before it runs dry.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The `i`-th item of the feed.
    pub fn item(&self, i: usize) -> ContentItem {
        let author = format!("user{i}");
        let created_at = self.anchor - Duration::minutes(i as i64);
        match i % 6 {
            0 => ContentItem::text(author, created_at, format!("Text post #{i}, welcome to the feed")),
            1 | 2 => ContentItem::photo(
                author,
                created_at,
                format!("https://picsum.photos/id/{}/800/500", 100 + i % 100),
            )
            .with_caption(format!("Photo caption for post #{i}")),
            3 | 4 => {
                let media_ref = if i % 2 == 0 {
                    "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
                } else {
                    "https://vimeo.com/76979871"
                };
                ContentItem::video(author, created_at, media_ref).with_caption(format!("Video caption for post #{i}"))
            }
            _ => ContentItem::text(author, created_at, format!("Another text post #{i}")),
        }
    }
}

impl ContentProvider for SyntheticProvider {
    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ContentItem>> {
        let items = page_range(page_index, page_size, self.total)
            .map(|range| range.map(|i| self.item(i)).collect())
            .unwrap_or_default();
        Ok(items)
    }
}

/// Pages over a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    items: Vec<ContentItem>,
}

impl StaticProvider {
    /// Serve the given items in order.
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    /// All items, in serving order.
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }
}

impl ContentProvider for StaticProvider {
    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ContentItem>> {
        let items = page_range(page_index, page_size, self.items.len())
            .map(|range| self.items[range].to_vec())
            .unwrap_or_default();
        Ok(items)
    }
}

/// A small hand-written feed of six items, created between 5 and 35 minutes before `now`.
pub fn sample_feed(now: DateTime<Utc>) -> Vec<ContentItem> {
    let ago = |minutes| now - Duration::minutes(minutes);
    vec![
        ContentItem::text(
            "alice",
            ago(5),
            "Hello world! This is a simple text post showcasing line wrapping and layout in the feed.",
        ),
        ContentItem::photo("bob", ago(10), "https://picsum.photos/id/1025/600/400")
            .with_caption("Enjoying a day outdoors with this cute dog!"),
        ContentItem::video("carol", ago(15), "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .with_caption("My favorite music video, hit play!"),
        ContentItem::photo("dave", ago(25), "https://picsum.photos/id/1003/800/600")
            .with_caption("A beautiful mountain view at sunset."),
        ContentItem::text("eve", ago(30), "Short text only post."),
        ContentItem::video("frank", ago(35), "https://vimeo.com/76979871")
            .with_caption("Incredible time-lapse video."),
    ]
}
