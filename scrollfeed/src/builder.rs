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

use std::sync::Arc;

use scrollfeed_common::{code::Value, error::Result, metrics::Metrics, pool::WorkerPool};
use scrollfeed_memory::{CacheBuilder, FetchCoordinator, MediaCache};

use crate::{
    config::FeedConfig,
    controller::{FeedController, FeedParts},
    media::MediaLoader,
    provider::ContentProvider,
    renderer::Renderer,
    trigger::{FractionTrigger, LoadTrigger},
};

/// Builder of [`FeedController`].
pub struct FeedBuilder<M, R> {
    name: String,
    provider: Arc<dyn ContentProvider>,
    renderer: R,
    loader: Arc<dyn MediaLoader<M>>,
    config: FeedConfig,
    trigger: Option<Box<dyn LoadTrigger>>,
    pool: Option<Arc<WorkerPool>>,
    cache: Option<MediaCache<String, M>>,
    metrics: Option<Arc<Metrics>>,
}

impl<M, R> FeedBuilder<M, R>
where
    M: Value,
    R: Renderer<M>,
{
    /// Create a feed builder with the default configuration.
    pub fn new(provider: impl ContentProvider, renderer: R, loader: impl MediaLoader<M>) -> Self {
        Self {
            name: "feed".to_string(),
            provider: Arc::new(provider),
            renderer,
            loader: Arc::new(loader),
            config: FeedConfig::default(),
            trigger: None,
            pool: None,
            cache: None,
            metrics: None,
        }
    }

    /// Set the feed name, used in logs, metric labels and worker thread names.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the feed configuration. It is validated by [`FeedBuilder::build`].
    pub fn with_config(mut self, config: FeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`FractionTrigger`] built from `scroll_trigger_fraction`.
    pub fn with_trigger(mut self, trigger: impl LoadTrigger + 'static) -> Self {
        self.trigger = Some(Box::new(trigger));
        self
    }

    /// Run page and media fetches on an existing pool instead of a dedicated one.
    ///
    /// The pool is closed when the feed is dropped.
    pub fn with_worker_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Publish media into an existing cache. `cache_capacity`, `soft_cache_capacity` and
    /// `eviction` are ignored.
    pub fn with_cache(mut self, cache: MediaCache<String, M>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Share a metrics handle set instead of registering a new one.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the configuration and build the feed. No page is requested yet.
    pub fn build(self) -> Result<FeedController<M, R>> {
        self.config.validate()?;

        let metrics = self.metrics.unwrap_or_else(|| Arc::new(Metrics::new(&self.name)));
        let pool = match self.pool {
            Some(pool) => pool,
            None => Arc::new(WorkerPool::new(format!("{}-fetch", self.name), self.config.fetch_workers)?),
        };
        let cache = match self.cache {
            Some(cache) => cache,
            None => CacheBuilder::new(self.config.cache_capacity)
                .with_name(self.name.clone())
                .with_eviction_config(self.config.eviction)
                .with_soft_tier(self.config.soft_cache_capacity)
                .with_metrics(metrics.clone())
                .build(),
        };
        let trigger = self
            .trigger
            .unwrap_or_else(|| Box::new(FractionTrigger::new(self.config.scroll_trigger_fraction)));

        Ok(FeedController::new(FeedParts {
            name: self.name,
            config: self.config,
            provider: self.provider,
            loader: self.loader,
            renderer: self.renderer,
            trigger,
            fetcher: FetchCoordinator::new(cache, pool),
            metrics,
        }))
    }
}
