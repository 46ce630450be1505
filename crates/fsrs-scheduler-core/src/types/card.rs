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

use crate::config::SchedulerConfig;
use crate::error::Fallible;
use crate::error::invalid;
use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// A learner's memory record for one item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// How intrinsically hard the item is. `None` until the first review.
    pub difficulty: Option<Difficulty>,
    /// Days until retrievability decays to 90%. `None` until the first
    /// review.
    pub stability: Option<Stability>,
    /// When the card is next eligible for review.
    pub due: Timestamp,
    pub state: State,
    /// Index into the learning or relearning steps. `None` in review.
    #[serde(default)]
    pub step: Option<usize>,
    #[serde(default)]
    pub last_review: Option<Timestamp>,
    /// Number of reviews.
    #[serde(default)]
    pub reps: u32,
    /// Number of times the card was forgotten while in review.
    #[serde(default)]
    pub lapses: u32,
}

/// The memory state of a card that has been reviewed at least once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryState {
    pub difficulty: Difficulty,
    pub stability: Stability,
}

impl Card {
    /// A card that has never been reviewed, due at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            difficulty: None,
            stability: None,
            due: now,
            state: State::Learning,
            step: Some(0),
            last_review: None,
            reps: 0,
            lapses: 0,
        }
    }

    pub fn memory(&self) -> Option<MemoryState> {
        match (self.difficulty, self.stability) {
            (Some(difficulty), Some(stability)) => Some(MemoryState {
                difficulty,
                stability,
            }),
            _ => None,
        }
    }

    /// Check the card against the bounds in `config`.
    pub fn validate(&self, config: &SchedulerConfig) -> Fallible<()> {
        if let Some(d) = self.difficulty {
            if !d.is_finite() || d < config.min_difficulty || d > config.max_difficulty {
                return invalid(format!(
                    "difficulty must be between {} and {}, got {d}",
                    config.min_difficulty, config.max_difficulty
                ));
            }
        }
        if let Some(s) = self.stability {
            if !s.is_finite() || s <= 0.0 {
                return invalid(format!("stability must be positive, got {s}"));
            }
        }
        if self.difficulty.is_some() != self.stability.is_some() {
            return invalid("difficulty and stability must be set together");
        }
        if let Some(last_review) = self.last_review {
            if self.due < last_review {
                return invalid(format!(
                    "due date {} precedes last review {last_review}",
                    self.due
                ));
            }
        }
        match self.state {
            State::Learning => {}
            State::Review | State::Relearning => {
                if self.memory().is_none() {
                    return invalid(format!(
                        "a card in state {} must have a difficulty and a stability",
                        self.state
                    ));
                }
                if self.last_review.is_none() {
                    return invalid(format!(
                        "a card in state {} must have a last review",
                        self.state
                    ));
                }
            }
        }
        Ok(())
    }
}
