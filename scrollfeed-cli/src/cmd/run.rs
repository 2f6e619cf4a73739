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

use chrono::Utc;
use clap::Args;
use scrollfeed::{sample_feed, FeedBuilder, ScrollPosition, SyntheticProvider};

use super::FeedArgs;
use crate::{
    demo::{DemoLoader, TextRenderer},
    error::{Error, Result},
};

/// Height of one card in the simulated layout.
const ROW_HEIGHT: f64 = 120.0;
/// Height of the simulated viewport.
const VIEWPORT: f64 = 800.0;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    feed: FeedArgs,

    /// Number of items the generated feed holds.
    #[arg(long, default_value_t = 5000)]
    total: usize,

    /// Number of scroll steps to the bottom of the loaded window.
    #[arg(long, default_value_t = 20)]
    scrolls: usize,

    /// Maximum simulated media latency in milliseconds.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,

    /// Probability of a simulated media decode failure.
    #[arg(long, default_value_t = 0.05)]
    failure_rate: f64,

    /// Time to wait for outstanding page and media fetches after each step, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Start from the hand-written sample feed instead of loading the first page.
    #[arg(long)]
    sample: bool,

    /// Print every card as it is materialized, refreshed and dropped.
    #[arg(long)]
    print_cards: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = args.feed.load()?;
    let timeout = Duration::from_millis(args.timeout_ms);
    let loader = DemoLoader::new(Duration::from_millis(args.latency_ms), args.failure_rate)?;

    let mut feed = FeedBuilder::new(
        SyntheticProvider::new(args.total),
        TextRenderer::new(args.print_cards),
        loader,
    )
    .with_name("demo")
    .with_config(config)
    .build()?;

    let start = Instant::now();

    if args.sample {
        feed.seed(sample_feed(Utc::now()));
    } else {
        feed.request_more();
    }
    if !feed.wait_idle(timeout) {
        return Err(Error::Timeout(timeout));
    }

    for step in 0..args.scrolls {
        let extent = feed.len() as f64 * ROW_HEIGHT;
        let position = ScrollPosition::new((extent - VIEWPORT).max(0.0), VIEWPORT, extent)
            .with_last_visible(feed.len().saturating_sub(1));
        let requested = feed.scroll_proximity_changed(&position);
        if !feed.wait_idle(timeout) {
            return Err(Error::Timeout(timeout));
        }

        tracing::info!(
            "[demo]: step {step}: requested {requested}, window {}, next page {}, cursor {:?}",
            feed.len(),
            feed.cursor().next_page_index(),
            feed.cursor().state()
        );

        if feed.cursor().is_exhausted() {
            break;
        }
    }

    let cache = feed.fetcher().cache();
    let renderer = feed.renderer();
    println!("elapsed:         {:?}", start.elapsed());
    println!("window:          {} / {}", feed.len(), feed.config().retention_limit);
    println!("pages loaded:    {}", feed.cursor().next_page_index());
    println!("cursor:          {:?}", feed.cursor().state());
    println!("cards:           {} materialized, {} dropped", renderer.materialized, renderer.dematerialized);
    println!("media:           {} ready, {} failed", renderer.ready, renderer.failed);
    println!("media cache:     {} / {}", cache.len(), cache.capacity());

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    #[test]
    fn test_rejects_non_finite_failure_rate() {
        for rate in ["NaN", "inf", "2"] {
            let cli = TestCli::try_parse_from(["scrollfeed", "--failure-rate", rate]).unwrap();
            assert!(matches!(run(cli.run), Err(Error::Other(_))), "rate {rate}");
        }
    }
}
