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

use std::collections::VecDeque;

use crate::{item::ContentItem, media::MediaState};

/// Append sequence number of a window entry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u64);

impl SlotId {
    /// The raw slot number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// One materialized item of the window.
#[derive(Debug)]
pub struct FeedEntry<M, H> {
    slot: SlotId,
    item: ContentItem,
    media: Option<MediaState<M>>,
    handle: H,
}

impl<M, H> FeedEntry<M, H> {
    /// The slot the entry occupies.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// The content item.
    pub fn item(&self) -> &ContentItem {
        &self.item
    }

    /// Media state, `None` for text items.
    pub fn media(&self) -> Option<&MediaState<M>> {
        self.media.as_ref()
    }

    /// The handle the renderer returned for this entry.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut H, &ContentItem, &mut Option<MediaState<M>>) {
        (&mut self.handle, &self.item, &mut self.media)
    }

    pub(crate) fn into_handle(self) -> H {
        self.handle
    }
}

/// Ordered window of materialized entries, oldest first.
///
/// Slots increase strictly from head to tail and are contiguous, so an entry is found by
/// offset from the head slot.
#[derive(Debug)]
pub struct FeedWindow<M, H> {
    entries: VecDeque<FeedEntry<M, H>>,
    next_slot: u64,
}

impl<M, H> Default for FeedWindow<M, H> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            next_slot: 0,
        }
    }
}

impl<M, H> FeedWindow<M, H> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the entries, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FeedEntry<M, H>> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Items in window order.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.entries.iter().map(|entry| &entry.item)
    }

    /// The oldest entry.
    pub fn front(&self) -> Option<&FeedEntry<M, H>> {
        self.entries.front()
    }

    /// The newest entry.
    pub fn back(&self) -> Option<&FeedEntry<M, H>> {
        self.entries.back()
    }

    /// Look up an entry by slot.
    pub fn get(&self, slot: SlotId) -> Option<&FeedEntry<M, H>> {
        self.position(slot).and_then(|index| self.entries.get(index))
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut FeedEntry<M, H>> {
        self.position(slot).and_then(|index| self.entries.get_mut(index))
    }

    /// The slot the next pushed entry will get.
    pub(crate) fn next_slot(&self) -> SlotId {
        SlotId(self.next_slot)
    }

    pub(crate) fn push_back(&mut self, item: ContentItem, media: Option<MediaState<M>>, handle: H) -> SlotId {
        let slot = self.next_slot();
        self.next_slot += 1;
        self.entries.push_back(FeedEntry {
            slot,
            item,
            media,
            handle,
        });
        slot
    }

    pub(crate) fn pop_front(&mut self) -> Option<FeedEntry<M, H>> {
        self.entries.pop_front()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = FeedEntry<M, H>> + '_ {
        self.entries.drain(..)
    }

    fn position(&self, slot: SlotId) -> Option<usize> {
        let head = self.entries.front()?.slot.0;
        let offset = slot.0.checked_sub(head)?;
        usize::try_from(offset).ok().filter(|index| *index < self.entries.len())
    }
}
