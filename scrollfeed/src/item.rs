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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a feed item shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentKind {
    /// Caption only.
    Text,
    /// A still image fetched from `media_ref`.
    Photo {
        /// Media reference, usually a URL.
        media_ref: String,
    },
    /// A video whose thumbnail is fetched from `media_ref`.
    Video {
        /// Media reference, usually a URL.
        media_ref: String,
    },
}

/// One immutable entry of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Author display name.
    pub author: String,
    /// Creation time, used to order the initial window.
    pub created_at: DateTime<Utc>,
    /// Kind and media of the item.
    #[serde(flatten)]
    pub kind: ContentKind,
    /// Text body or media caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl ContentItem {
    /// A text post.
    pub fn text(author: impl Into<String>, created_at: DateTime<Utc>, caption: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            created_at,
            kind: ContentKind::Text,
            caption: Some(caption.into()),
        }
    }

    /// A photo post.
    pub fn photo(author: impl Into<String>, created_at: DateTime<Utc>, media_ref: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            created_at,
            kind: ContentKind::Photo {
                media_ref: media_ref.into(),
            },
            caption: None,
        }
    }

    /// A video post.
    pub fn video(author: impl Into<String>, created_at: DateTime<Utc>, media_ref: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            created_at,
            kind: ContentKind::Video {
                media_ref: media_ref.into(),
            },
            caption: None,
        }
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Media reference of photo and video items.
    pub fn media_ref(&self) -> Option<&str> {
        match &self.kind {
            ContentKind::Text => None,
            ContentKind::Photo { media_ref } | ContentKind::Video { media_ref } => Some(media_ref),
        }
    }

    /// Whether the item carries no media.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ContentKind::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_ref() {
        let now = Utc::now();
        assert_eq!(ContentItem::text("a", now, "hi").media_ref(), None);
        assert_eq!(ContentItem::photo("a", now, "p").media_ref(), Some("p"));
        assert_eq!(ContentItem::video("a", now, "v").media_ref(), Some("v"));
        assert!(ContentItem::text("a", now, "hi").is_text());
    }

    #[test]
    fn test_json_shape() {
        let item: ContentItem = serde_json::from_str(
            r#"{"author":"alice","created_at":"2024-05-01T10:00:00Z","type":"photo","media_ref":"https://img/1"}"#,
        )
        .unwrap();
        assert_eq!(item.author, "alice");
        assert_eq!(item.media_ref(), Some("https://img/1"));
        assert_eq!(item.caption, None);
    }
}
