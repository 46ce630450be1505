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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::invalid;

/// Where a card is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    /// Newly introduced; walking the learning steps.
    Learning,
    /// Graduated; scheduled by stability.
    Review,
    /// Lapsed from review; walking the relearning steps.
    Relearning,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Learning => "LEARNING",
            State::Review => "REVIEW",
            State::Relearning => "RELEARNING",
        }
    }
}

impl FromStr for State {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEARNING" => Ok(State::Learning),
            "REVIEW" => Ok(State::Review),
            "RELEARNING" => Ok(State::Relearning),
            _ => invalid(format!(
                "invalid state: {s:?} (expected LEARNING, REVIEW, or RELEARNING)"
            )),
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
