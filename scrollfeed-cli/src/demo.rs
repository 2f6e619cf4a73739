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

use std::time::Duration;

use rand::Rng;
use scrollfeed::{ContentItem, ContentKind, Error, ErrorKind, MediaLoader, MediaState, Renderer, Result};

/// Display width every media object is scaled to.
pub const CONTENT_WIDTH: u32 = 600;

/// Dimensions assumed for media references that do not encode any.
const FALLBACK_SIZE: (u32, u32) = (1280, 720);

/// Stand-in for a decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
}

/// Scale `(width, height)` to `target` width, keeping the aspect ratio.
pub fn scale_to_width(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width == 0 {
        return (target, 0);
    }
    let height = height as u64 * target as u64 / width as u64;
    (target, u32::try_from(height).unwrap_or(u32::MAX))
}

/// Read `.../{width}/{height}` from the tail of a media reference.
fn dimensions(media_ref: &str) -> Option<(u32, u32)> {
    let mut segments = media_ref.trim_end_matches('/').rsplit('/');
    let height = segments.next()?.parse().ok()?;
    let width = segments.next()?.parse().ok()?;
    Some((width, height))
}

/// Loader that pretends to download and decode media.
///
/// Each load sleeps up to `max_latency` and fails with probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct DemoLoader {
    max_latency: Duration,
    failure_rate: f64,
}

impl DemoLoader {
    pub fn new(max_latency: Duration, failure_rate: f64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&failure_rate),
            "failure rate must be within [0, 1], got {failure_rate}"
        );
        Ok(Self {
            max_latency,
            failure_rate,
        })
    }
}

impl MediaLoader<DecodedImage> for DemoLoader {
    fn load(&self, media_ref: &str) -> Result<Option<DecodedImage>> {
        let mut rng = rand::rng();
        if !self.max_latency.is_zero() {
            std::thread::sleep(self.max_latency.mul_f64(rng.random::<f64>()));
        }
        if rng.random_bool(self.failure_rate) {
            return Err(Error::new(ErrorKind::Decode, "corrupted media").with_context("media_ref", media_ref));
        }
        let (width, height) = dimensions(media_ref).unwrap_or(FALLBACK_SIZE);
        Ok(Some(DecodedImage { width, height }))
    }
}

/// One rendered card.
#[derive(Debug)]
pub struct Card {
    pub id: usize,
    pub line: String,
}

/// Renders cards as text lines and keeps counts of what happened.
#[derive(Debug, Default)]
pub struct TextRenderer {
    print: bool,
    next: usize,
    pub live: usize,
    pub materialized: usize,
    pub dematerialized: usize,
    pub ready: usize,
    pub failed: usize,
}

impl TextRenderer {
    pub fn new(print: bool) -> Self {
        Self {
            print,
            ..Default::default()
        }
    }

    fn describe(item: &ContentItem, media: Option<&MediaState<DecodedImage>>) -> String {
        let kind = match item.kind {
            ContentKind::Text => "text",
            ContentKind::Photo { .. } => "photo",
            ContentKind::Video { .. } => "video",
        };
        let media = match media {
            None => String::new(),
            Some(MediaState::Loading) => " [loading...]".to_string(),
            Some(MediaState::Ready(image)) => {
                let (width, height) = scale_to_width(image.width, image.height, CONTENT_WIDTH);
                format!(" [{width}x{height}]")
            }
            Some(MediaState::Failed(_)) if item.media_ref().is_some_and(str::is_empty) => {
                " [media reference missing]".to_string()
            }
            Some(MediaState::Failed(_)) => " [failed to load media]".to_string(),
        };
        format!(
            "{} {} {kind}{media} {}",
            item.author,
            item.created_at.format("%Y-%m-%d %H:%M"),
            item.caption.as_deref().unwrap_or_default()
        )
    }

    fn emit(&self, prefix: &str, card: &Card) {
        if self.print {
            println!("{prefix} #{:<5} {}", card.id, card.line);
        }
    }
}

impl Renderer<DecodedImage> for TextRenderer {
    type Handle = Card;

    fn materialize(&mut self, item: &ContentItem, media: Option<&MediaState<DecodedImage>>) -> Card {
        let card = Card {
            id: self.next,
            line: Self::describe(item, media),
        };
        self.next += 1;
        self.live += 1;
        self.materialized += 1;
        match media {
            Some(MediaState::Ready(_)) => self.ready += 1,
            Some(MediaState::Failed(_)) => self.failed += 1,
            _ => {}
        }
        self.emit("+", &card);
        card
    }

    fn refresh(&mut self, card: &mut Card, item: &ContentItem, media: &MediaState<DecodedImage>) {
        card.line = Self::describe(item, Some(media));
        match media {
            MediaState::Ready(_) => self.ready += 1,
            MediaState::Failed(_) => self.failed += 1,
            MediaState::Loading => {}
        }
        self.emit("~", card);
    }

    fn dematerialize(&mut self, card: Card) {
        self.live -= 1;
        self.dematerialized += 1;
        self.emit("-", &card);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_scale_to_width() {
        assert_eq!(scale_to_width(800, 500, 600), (600, 375));
        assert_eq!(scale_to_width(300, 300, 600), (600, 600));
        assert_eq!(scale_to_width(0, 300, 600), (600, 0));
        assert_eq!(scale_to_width(1, u32::MAX, 600), (600, u32::MAX));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions("https://picsum.photos/id/101/800/500"), Some((800, 500)));
        assert_eq!(dimensions("https://vimeo.com/76979871"), None);
    }

    #[test]
    fn test_demo_loader() {
        let loader = DemoLoader::new(Duration::ZERO, 0.0).unwrap();
        assert_eq!(
            loader.load("https://picsum.photos/id/1/800/500").unwrap(),
            Some(DecodedImage { width: 800, height: 500 })
        );
        let loader = DemoLoader::new(Duration::ZERO, 1.0).unwrap();
        assert_eq!(loader.load("x").unwrap_err().kind(), ErrorKind::Decode);

        for rate in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            assert!(DemoLoader::new(Duration::ZERO, rate).is_err());
        }
    }

    #[test]
    fn test_text_renderer_lifecycle() {
        let mut renderer = TextRenderer::new(false);
        let item = ContentItem::photo("bob", Utc::now(), "").with_caption("dog");
        let failed = MediaState::Failed(Error::new(ErrorKind::Fetch, "media reference missing"));

        let card = renderer.materialize(&item, Some(&failed));
        assert!(card.line.contains("media reference missing"));
        assert_eq!((renderer.live, renderer.failed), (1, 1));

        renderer.dematerialize(card);
        assert_eq!((renderer.live, renderer.dematerialized), (0, 1));
    }
}
