// Copyright 2025 Fernando Borretti
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

use std::fs::read_to_string;
use std::io::Read;
use std::io::stdin;
use std::path::PathBuf;

use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::Scheduler;
use fsrs_scheduler_core::Timestamp;
use fsrs_scheduler_core::fail;

use crate::config::load_config;
use crate::wire::ReviewResponse;
use crate::wire::parse_request;
use crate::wire::process;

/// Review one card offline: read a request, print the response.
pub fn review_card(config: Option<PathBuf>, input: Option<PathBuf>) -> Fallible<()> {
    let body = match input {
        Some(path) => {
            if !path.exists() {
                return fail("input file does not exist.");
            }
            read_to_string(path)?
        }
        None => {
            let mut body = String::new();
            stdin().read_to_string(&mut body)?;
            body
        }
    };
    let response = review_body(config, &body, Timestamp::now())?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn review_body(config: Option<PathBuf>, body: &str, now: Timestamp) -> Fallible<ReviewResponse> {
    let config = load_config(config.as_deref())?;
    let scheduler = Scheduler::new(config)?;
    let request = parse_request(body)?;
    process(&scheduler, request, now)
}
