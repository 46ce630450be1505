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

//! The card lifecycle: which state a rating moves a card to, and how the
//! next interval is chosen. Learning and relearning walk a table of short
//! fixed steps; review is scheduled from stability.

use chrono::Duration;

use crate::types::rating::Rating;
use crate::types::state::State;

/// How the next interval is picked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NextInterval {
    /// A fixed learning or relearning step.
    Step(Duration),
    /// Derived from the card's updated stability.
    Scheduled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub state: State,
    pub step: Option<usize>,
    pub interval: NextInterval,
    /// Whether a card in review was forgotten.
    pub lapse: bool,
}

impl Transition {
    fn graduate() -> Self {
        Self {
            state: State::Review,
            step: None,
            interval: NextInterval::Scheduled,
            lapse: false,
        }
    }

    fn step(state: State, step: usize, steps: &[Duration]) -> Self {
        Self {
            state,
            step: Some(step),
            interval: NextInterval::Step(steps[step]),
            lapse: false,
        }
    }
}

/// The step tables, converted once from the configured minutes.
#[derive(Clone, Debug, PartialEq)]
pub struct Steps {
    pub learning: Vec<Duration>,
    pub relearning: Vec<Duration>,
}

impl Steps {
    pub fn from_minutes(learning: &[u32], relearning: &[u32]) -> Self {
        let convert = |steps: &[u32]| {
            steps
                .iter()
                .map(|m| Duration::minutes(*m as i64))
                .collect::<Vec<_>>()
        };
        Self {
            learning: convert(learning),
            relearning: convert(relearning),
        }
    }

    pub fn transition(&self, state: State, step: Option<usize>, rating: Rating) -> Transition {
        match state {
            State::Learning => walk_steps(State::Learning, &self.learning, step, rating),
            State::Relearning => walk_steps(State::Relearning, &self.relearning, step, rating),
            State::Review => match rating {
                Rating::Again => {
                    if self.relearning.is_empty() {
                        Transition {
                            lapse: true,
                            ..Transition::graduate()
                        }
                    } else {
                        Transition {
                            lapse: true,
                            ..Transition::step(State::Relearning, 0, &self.relearning)
                        }
                    }
                }
                Rating::Hard | Rating::Good | Rating::Easy => Transition::graduate(),
            },
        }
    }
}

fn walk_steps(state: State, steps: &[Duration], step: Option<usize>, rating: Rating) -> Transition {
    if steps.is_empty() {
        return Transition::graduate();
    }
    let step = step.unwrap_or(0);
    let last = steps.len() - 1;
    if step > last {
        // The step table shrank since this card was last reviewed.
        return match rating {
            Rating::Again => Transition::step(state, 0, steps),
            Rating::Hard | Rating::Good | Rating::Easy => Transition::graduate(),
        };
    }
    match rating {
        Rating::Again => Transition::step(state, 0, steps),
        Rating::Hard => Transition::step(state, (step + 1).min(last), steps),
        Rating::Good => {
            if step == last {
                Transition::graduate()
            } else {
                Transition::step(state, step + 1, steps)
            }
        }
        Rating::Easy => Transition::graduate(),
    }
}
