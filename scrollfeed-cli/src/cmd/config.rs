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

use clap::Args;

use super::FeedArgs;
use crate::error::Result;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    feed: FeedArgs,

    /// Print on a single line.
    #[arg(long)]
    compact: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = args.feed.load()?;
    let json = if args.compact {
        serde_json::to_string(&config)?
    } else {
        serde_json::to_string_pretty(&config)?
    };
    println!("{json}");
    Ok(())
}
