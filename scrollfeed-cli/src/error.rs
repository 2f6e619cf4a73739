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

use std::fmt::Debug;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Error reported by the feed.
    #[error("feed error: {0}")]
    Feed(#[from] scrollfeed::Error),
    /// The feed did not settle in time.
    #[error("feed did not settle within {0:?}")]
    Timeout(std::time::Duration),
    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
