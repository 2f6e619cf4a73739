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

use std::path::Path;

use scrollfeed_common::{
    error::{Error, ErrorKind, Result},
    pool::WorkerPool,
};
use scrollfeed_memory::EvictionConfig;
use serde::{Deserialize, Serialize};

/// What the feed does when the content provider fails to deliver a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePolicy {
    /// Treat the failure as the end of the feed. The cursor becomes exhausted.
    #[default]
    Exhaust,
    /// Park the cursor in the failed state. The next request retries the same page.
    Retry,
}

/// Feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Items requested per page.
    pub page_size: usize,
    /// Maximum number of items kept in the window.
    pub retention_limit: usize,
    /// Maximum number of decoded media objects kept by the media cache.
    pub cache_capacity: usize,
    /// Scroll fraction of the loaded extent that triggers the next page.
    pub scroll_trigger_fraction: f64,
    /// Worker threads for page and media fetches.
    pub fetch_workers: usize,
    /// Evicted media remembered weakly. 0 disables the soft tier.
    pub soft_cache_capacity: usize,
    /// Media cache eviction algorithm.
    pub eviction: EvictionConfig,
    /// Page failure handling.
    pub page_failure: PagePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 15,
            retention_limit: 150,
            cache_capacity: 96,
            scroll_trigger_fraction: 0.85,
            fetch_workers: WorkerPool::default_workers(),
            soft_cache_capacity: 0,
            eviction: EvictionConfig::default(),
            page_failure: PagePolicy::default(),
        }
    }
}

impl FeedConfig {
    /// Check every option, returning the first violation as a [`ErrorKind::Config`] error.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size", self.page_size, "must be positive"));
        }
        if self.retention_limit == 0 {
            return Err(Error::config("retention_limit", self.retention_limit, "must be positive"));
        }
        if self.cache_capacity == 0 {
            return Err(Error::config("cache_capacity", self.cache_capacity, "must be positive"));
        }
        if !(self.scroll_trigger_fraction > 0.0 && self.scroll_trigger_fraction < 1.0) {
            return Err(Error::config(
                "scroll_trigger_fraction",
                self.scroll_trigger_fraction,
                "must be within (0, 1)",
            ));
        }
        if self.fetch_workers == 0 {
            return Err(Error::config("fetch_workers", self.fetch_workers, "must be positive"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing options take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::new(ErrorKind::Config, "malformed feed configuration").with_source(e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file. See [`FeedConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io_error(e).with_context("path", path.display()))?;
        Self::from_json(&json).map_err(|e| e.with_context("path", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 15);
        assert_eq!(config.retention_limit, 150);
        assert_eq!(config.cache_capacity, 96);
        assert_eq!(config.scroll_trigger_fraction, 0.85);
        assert!(config.fetch_workers >= 2);
        assert_eq!(config.page_failure, PagePolicy::Exhaust);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects() {
        let cases: Vec<(&str, Box<dyn Fn(&mut FeedConfig)>)> = vec![
            ("page_size", Box::new(|c: &mut FeedConfig| c.page_size = 0)),
            ("retention_limit", Box::new(|c: &mut FeedConfig| c.retention_limit = 0)),
            ("cache_capacity", Box::new(|c: &mut FeedConfig| c.cache_capacity = 0)),
            ("scroll_trigger_fraction", Box::new(|c: &mut FeedConfig| c.scroll_trigger_fraction = 1.0)),
            ("scroll_trigger_fraction", Box::new(|c: &mut FeedConfig| c.scroll_trigger_fraction = f64::NAN)),
            ("fetch_workers", Box::new(|c: &mut FeedConfig| c.fetch_workers = 0)),
        ];
        for (option, mutate) in cases {
            let mut config = FeedConfig::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert_eq!(err.context()[0], ("option", option.to_string()));
        }
    }

    #[test]
    fn test_from_json() {
        let config = FeedConfig::from_json(r#"{"page_size": 2, "page_failure": "retry", "eviction": "fifo"}"#).unwrap();
        assert_eq!(config.page_size, 2);
        assert_eq!(config.retention_limit, 150);
        assert_eq!(config.page_failure, PagePolicy::Retry);
        assert_eq!(config.eviction, EvictionConfig::Fifo);

        let err = FeedConfig::from_json(r#"{"page_size": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = FeedConfig::from_json("{").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("feed.json");
        std::fs::write(&path, r#"{"retention_limit": 30, "soft_cache_capacity": 8}"#).unwrap();
        let config = FeedConfig::from_path(&path).unwrap();
        assert_eq!(config.retention_limit, 30);
        assert_eq!(config.soft_cache_capacity, 8);
        assert_eq!(config.page_size, 15);
        assert_eq!(config.cache_capacity, 96);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"page_size": "many"}"#).unwrap();
        let err = FeedConfig::from_path(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.context().contains(&("path", bad.display().to_string())));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, r#"{"fetch_workers": 0}"#).unwrap();
        let err = FeedConfig::from_path(&invalid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.context()[0], ("option", "fetch_workers".to_string()));

        let err = FeedConfig::from_path(dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
