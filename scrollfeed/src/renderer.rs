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

use crate::{item::ContentItem, media::MediaState};

/// Turns feed entries into display handles.
///
/// Every method is called on the presentation context, the thread that owns the feed
/// controller, and must not block. Each handle produced by [`Renderer::materialize`] is
/// eventually passed back to [`Renderer::dematerialize`] exactly once.
pub trait Renderer<M> {
    /// Opaque display handle of one entry.
    type Handle;

    /// Build the display of `item`.
    ///
    /// `media` is `None` for text items, otherwise the media state at creation time.
    fn materialize(&mut self, item: &ContentItem, media: Option<&MediaState<M>>) -> Self::Handle;

    /// Update a display in place after its media state changed.
    fn refresh(&mut self, handle: &mut Self::Handle, item: &ContentItem, media: &MediaState<M>);

    /// Tear a display down.
    fn dematerialize(&mut self, handle: Self::Handle);
}
