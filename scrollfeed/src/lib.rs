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

//! scrollfeed - an infinitely scrolling feed over a bounded window and a bounded media cache.
//!
//! A [`FeedController`] pulls pages from a [`ContentProvider`] as the user approaches the
//! loaded tail, materializes every item through a [`Renderer`] and keeps at most
//! `retention_limit` items by dropping the oldest ones. Photo and video media are loaded by a
//! [`MediaLoader`] on a worker pool, deduplicated per media reference and kept in a
//! recency-ordered [`MediaCache`].

mod builder;
mod config;
mod controller;
mod cursor;
mod item;
mod media;
mod provider;
mod renderer;
mod trigger;
mod window;

mod prelude;
pub use prelude::*;
