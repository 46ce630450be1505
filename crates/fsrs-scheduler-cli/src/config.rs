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
use std::path::Path;

use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::SchedulerConfig;
use fsrs_scheduler_core::fail;

/// Load the scheduler configuration from a TOML file, or use the defaults
/// when no file is given.
pub fn load_config(path: Option<&Path>) -> Fallible<SchedulerConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return fail("configuration file does not exist.");
            }
            log::debug!("Loading configuration from {}", path.display());
            let content = read_to_string(path)?;
            SchedulerConfig::from_toml_str(&content)
        }
        None => {
            log::debug!("Using default configuration.");
            Ok(SchedulerConfig::default())
        }
    }
}
