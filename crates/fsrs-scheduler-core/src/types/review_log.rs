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

use serde::Deserialize;
use serde::Serialize;

use crate::types::rating::Rating;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// A record of one review event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub rating: Rating,
    /// The card's state before the review.
    pub state_before: State,
    /// The card's state after the review.
    pub state_after: State,
    /// Days since the previous review, `None` on the first review.
    pub elapsed_days: Option<f64>,
    /// Probability of recall at the moment of review, `None` on the first
    /// review.
    pub retrievability: Option<f64>,
    pub reviewed_at: Timestamp,
    /// Days from the review to the new due date.
    pub scheduled_days: f64,
}
