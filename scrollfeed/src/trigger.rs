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

use std::time::{Duration, Instant};

/// Scroll geometry reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Offset of the viewport top within the scrollable extent.
    pub offset: f64,
    /// Height of the viewport.
    pub viewport: f64,
    /// Total scrollable extent of the loaded window.
    pub extent: f64,
    /// Window index of the last at least partially visible entry, if the layout knows it.
    pub last_visible: Option<usize>,
}

impl ScrollPosition {
    /// Create a position without a last visible index.
    pub fn new(offset: f64, viewport: f64, extent: f64) -> Self {
        Self {
            offset,
            viewport,
            extent,
            last_visible: None,
        }
    }

    /// Set the index of the last visible window entry.
    pub fn with_last_visible(mut self, index: usize) -> Self {
        self.last_visible = Some(index);
        self
    }

    /// Offset of the viewport bottom.
    pub fn bottom(&self) -> f64 {
        self.offset + self.viewport
    }

    /// Last visible window index, estimated from the geometry for uniformly sized entries when
    /// the layout did not report it.
    pub fn last_visible_index(&self, loaded: usize) -> Option<usize> {
        if loaded == 0 {
            return None;
        }
        if let Some(index) = self.last_visible {
            return Some(index.min(loaded - 1));
        }
        if self.extent <= 0.0 {
            return Some(loaded - 1);
        }
        let seen = (self.bottom() / self.extent).clamp(0.0, 1.0) * loaded as f64;
        Some((seen.ceil() as usize).clamp(1, loaded) - 1)
    }
}

/// Decides when the feed should request the next page.
pub trait LoadTrigger {
    /// Whether a page should be requested now. `loaded` is the current window length.
    fn should_load(&mut self, position: &ScrollPosition, loaded: usize) -> bool;
}

impl<F> LoadTrigger for F
where
    F: FnMut(&ScrollPosition, usize) -> bool,
{
    fn should_load(&mut self, position: &ScrollPosition, loaded: usize) -> bool {
        self(position, loaded)
    }
}

/// Fires once the viewport bottom passes `fraction` of the scrollable extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionTrigger {
    fraction: f64,
}

impl FractionTrigger {
    /// Create a trigger at the given fraction of the extent.
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }
}

impl Default for FractionTrigger {
    fn default() -> Self {
        Self::new(0.85)
    }
}

impl LoadTrigger for FractionTrigger {
    fn should_load(&mut self, position: &ScrollPosition, _: usize) -> bool {
        position.bottom() >= position.extent * self.fraction
    }
}

/// Fires once at most `remaining` loaded entries are left below the last visible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTrigger {
    remaining: usize,
}

impl RemainingTrigger {
    /// Create a trigger with the given number of spare entries.
    pub fn new(remaining: usize) -> Self {
        Self { remaining }
    }
}

impl LoadTrigger for RemainingTrigger {
    fn should_load(&mut self, position: &ScrollPosition, loaded: usize) -> bool {
        match position.last_visible_index(loaded) {
            Some(last) => loaded - 1 - last <= self.remaining,
            None => true,
        }
    }
}

/// Fires whenever at least `interval` has passed since it last fired, regardless of position.
#[derive(Debug, Clone)]
pub struct IntervalTrigger {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalTrigger {
    /// Create a trigger that fires on its first call and then once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }
}

impl LoadTrigger for IntervalTrigger {
    fn should_load(&mut self, _: &ScrollPosition, _: usize) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_trigger() {
        let mut trigger = FractionTrigger::default();
        assert!(!trigger.should_load(&ScrollPosition::new(0.0, 100.0, 1000.0), 10));
        assert!(!trigger.should_load(&ScrollPosition::new(749.0, 100.0, 1000.0), 10));
        assert!(trigger.should_load(&ScrollPosition::new(750.0, 100.0, 1000.0), 10));
        // Content shorter than the viewport.
        assert!(trigger.should_load(&ScrollPosition::new(0.0, 500.0, 300.0), 2));
        assert!(trigger.should_load(&ScrollPosition::new(0.0, 0.0, 0.0), 0));
    }

    #[test]
    fn test_remaining_trigger() {
        let mut trigger = RemainingTrigger::new(3);
        let top = ScrollPosition::new(0.0, 100.0, 1000.0);
        assert!(!trigger.should_load(&top.with_last_visible(5), 10));
        assert!(trigger.should_load(&top.with_last_visible(6), 10));
        assert!(trigger.should_load(&top, 0));

        // Estimated from geometry: bottom at 90% of 10 entries is index 8.
        assert!(trigger.should_load(&ScrollPosition::new(800.0, 100.0, 1000.0), 10));
        assert!(!trigger.should_load(&ScrollPosition::new(400.0, 100.0, 1000.0), 10));
    }

    #[test]
    fn test_last_visible_estimate() {
        assert_eq!(ScrollPosition::new(0.0, 100.0, 1000.0).last_visible_index(10), Some(0));
        assert_eq!(ScrollPosition::new(800.0, 100.0, 1000.0).last_visible_index(10), Some(8));
        assert_eq!(ScrollPosition::new(950.0, 100.0, 1000.0).last_visible_index(10), Some(9));
        assert_eq!(ScrollPosition::new(0.0, 100.0, 1000.0).with_last_visible(42).last_visible_index(10), Some(9));
        assert_eq!(ScrollPosition::new(0.0, 100.0, 1000.0).last_visible_index(0), None);
    }

    #[test]
    fn test_interval_trigger() {
        let mut trigger = IntervalTrigger::new(Duration::from_secs(3600));
        let position = ScrollPosition::new(0.0, 0.0, 0.0);
        assert!(trigger.should_load(&position, 0));
        assert!(!trigger.should_load(&position, 0));

        let mut trigger = IntervalTrigger::new(Duration::ZERO);
        assert!(trigger.should_load(&position, 0));
        assert!(trigger.should_load(&position, 0));
    }

    #[test]
    fn test_closure_trigger() {
        let mut calls = 0;
        let mut trigger = |_: &ScrollPosition, loaded: usize| {
            calls += 1;
            loaded < 3
        };
        assert!(trigger.should_load(&ScrollPosition::new(0.0, 0.0, 0.0), 2));
        assert!(!trigger.should_load(&ScrollPosition::new(0.0, 0.0, 0.0), 3));
        drop(trigger);
        assert_eq!(calls, 2);
    }
}
