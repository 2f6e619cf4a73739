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

pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use scrollfeed::{EvictionConfig, FeedConfig, PagePolicy};

use crate::error::Result;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EvictionArg {
    Lru,
    Fifo,
}

impl From<EvictionArg> for EvictionConfig {
    fn from(arg: EvictionArg) -> Self {
        match arg {
            EvictionArg::Lru => EvictionConfig::Lru,
            EvictionArg::Fifo => EvictionConfig::Fifo,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PageFailureArg {
    /// Stop paging after a failed page.
    Exhaust,
    /// Retry the failed page on the next scroll.
    Retry,
}

impl From<PageFailureArg> for PagePolicy {
    fn from(arg: PageFailureArg) -> Self {
        match arg {
            PageFailureArg::Exhaust => PagePolicy::Exhaust,
            PageFailureArg::Retry => PagePolicy::Retry,
        }
    }
}

/// Feed configuration options shared by all subcommands.
///
/// Options given on the command line override the ones read from the configuration file.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// JSON feed configuration file. Missing options take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Items requested per page.
    #[arg(long)]
    page_size: Option<usize>,

    /// Maximum number of items kept in the window.
    #[arg(long)]
    retention_limit: Option<usize>,

    /// Maximum number of decoded media objects kept in memory.
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Scroll fraction of the loaded extent that loads the next page.
    #[arg(long)]
    scroll_trigger_fraction: Option<f64>,

    /// Worker threads for page and media fetches.
    #[arg(long)]
    fetch_workers: Option<usize>,

    /// Evicted media remembered weakly, 0 to disable.
    #[arg(long)]
    soft_cache_capacity: Option<usize>,

    /// Media cache eviction algorithm.
    #[arg(long, value_enum)]
    eviction: Option<EvictionArg>,

    /// What to do when a page fails to load.
    #[arg(long, value_enum)]
    page_failure: Option<PageFailureArg>,
}

impl FeedArgs {
    /// Read the configuration file, apply command line overrides and validate the result.
    pub fn load(&self) -> Result<FeedConfig> {
        let mut config = match &self.config {
            Some(path) => FeedConfig::from_path(path)?,
            None => FeedConfig::default(),
        };

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(retention_limit) = self.retention_limit {
            config.retention_limit = retention_limit;
        }
        if let Some(cache_capacity) = self.cache_capacity {
            config.cache_capacity = cache_capacity;
        }
        if let Some(fraction) = self.scroll_trigger_fraction {
            config.scroll_trigger_fraction = fraction;
        }
        if let Some(fetch_workers) = self.fetch_workers {
            config.fetch_workers = fetch_workers;
        }
        if let Some(soft_cache_capacity) = self.soft_cache_capacity {
            config.soft_cache_capacity = soft_cache_capacity;
        }
        if let Some(eviction) = self.eviction {
            config.eviction = eviction.into();
        }
        if let Some(page_failure) = self.page_failure {
            config.page_failure = page_failure.into();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use scrollfeed::ErrorKind;

    use super::*;
    use crate::error::Error;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        feed: FeedArgs,
    }

    fn load(args: &[&str]) -> Result<FeedConfig> {
        let cli = TestCli::try_parse_from(std::iter::once("scrollfeed").chain(args.iter().copied())).unwrap();
        cli.feed.load()
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, r#"{"page_size": 4, "retention_limit": 40, "eviction": "fifo"}"#).unwrap();
        let path = path.to_str().unwrap();

        let config = load(&["--config", path]).unwrap();
        assert_eq!(config.page_size, 4);
        assert_eq!(config.retention_limit, 40);
        assert_eq!(config.eviction, EvictionConfig::Fifo);

        let config = load(&["--config", path, "--page-size", "9", "--eviction", "lru"]).unwrap();
        assert_eq!(config.page_size, 9);
        assert_eq!(config.retention_limit, 40);
        assert_eq!(config.eviction, EvictionConfig::Lru);
    }

    #[test]
    fn test_flags_without_file() {
        let config = load(&["--retention-limit", "300", "--page-failure", "retry"]).unwrap();
        assert_eq!(config.retention_limit, 300);
        assert_eq!(config.page_failure, PagePolicy::Retry);
        assert_eq!(config.page_size, FeedConfig::default().page_size);
    }

    #[test]
    fn test_bad_file_or_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, "{ not json").unwrap();

        match load(&["--config", path.to_str().unwrap()]) {
            Err(Error::Feed(e)) => {
                assert_eq!(e.kind(), ErrorKind::Config);
                assert!(e.context().iter().any(|(k, _)| *k == "path"));
            }
            other => panic!("unexpected result {other:?}"),
        }

        match load(&["--page-size", "0"]) {
            Err(Error::Feed(e)) => assert_eq!(e.kind(), ErrorKind::Config),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
