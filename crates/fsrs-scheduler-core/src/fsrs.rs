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

//! The FSRS-6 memory model.
//!
//! Pure functions of the model weights: how recall probability decays over
//! time, and how difficulty and stability respond to a review.

use crate::config::SchedulerConfig;
use crate::types::rating::Rating;

/// Time, in days.
pub type T = f64;
/// Probability of recall, in `(0, 1]`.
pub type Retrievability = f64;
/// Days for retrievability to decay to 90%.
pub type Stability = f64;
pub type Difficulty = f64;

pub const PARAMETER_COUNT: usize = 21;

pub type Parameters = [f64; PARAMETER_COUNT];

/// Retrievability after one stability interval.
const ANCHOR: Retrievability = 0.9;

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryModel {
    w: Parameters,
    decay: f64,
    factor: f64,
    min_stability: Stability,
    min_difficulty: Difficulty,
    max_difficulty: Difficulty,
}

impl MemoryModel {
    pub fn new(config: &SchedulerConfig) -> Self {
        let w = config.parameters;
        let decay = -w[20];
        let factor = ANCHOR.powf(1.0 / decay) - 1.0;
        Self {
            w,
            decay,
            factor,
            min_stability: config.min_stability,
            min_difficulty: config.min_difficulty,
            max_difficulty: config.max_difficulty,
        }
    }

    /// Probability of recall `t` days after a review, for a card of
    /// stability `s`. Power-law decay.
    pub fn retrievability(&self, t: T, s: Stability) -> Retrievability {
        let t = t.max(0.0);
        (1.0 + self.factor * t / s).powf(self.decay)
    }

    /// The number of days after which retrievability falls to `r_d`.
    pub fn interval(&self, r_d: Retrievability, s: Stability) -> T {
        (s / self.factor) * (r_d.powf(1.0 / self.decay) - 1.0)
    }

    pub fn initial_stability(&self, rating: Rating) -> Stability {
        let s = match rating {
            Rating::Again => self.w[0],
            Rating::Hard => self.w[1],
            Rating::Good => self.w[2],
            Rating::Easy => self.w[3],
        };
        self.clamp_stability(s)
    }

    pub fn initial_difficulty(&self, rating: Rating) -> Difficulty {
        self.clamp_difficulty(self.raw_initial_difficulty(rating))
    }

    fn raw_initial_difficulty(&self, rating: Rating) -> Difficulty {
        let w = &self.w;
        w[4] - f64::exp(w[5] * (rating.value() - 1.0)) + 1.0
    }

    pub fn next_difficulty(&self, d: Difficulty, rating: Rating) -> Difficulty {
        let w = &self.w;
        let delta = -w[6] * (rating.value() - 3.0);
        // Linear damping: changes shrink as difficulty approaches the ceiling.
        let damped = d + delta * (self.max_difficulty - d) / 9.0;
        // Mean reversion towards the difficulty of an easy first review.
        let target = self.raw_initial_difficulty(Rating::Easy);
        let d = w[7] * target + (1.0 - w[7]) * damped;
        self.clamp_difficulty(d)
    }

    /// Stability after a successful recall (Hard, Good, or Easy).
    pub fn next_stability_on_success(
        &self,
        d: Difficulty,
        s: Stability,
        r: Retrievability,
        rating: Rating,
    ) -> Stability {
        let w = &self.w;
        let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };
        let growth = f64::exp(w[8])
            * (11.0 - d)
            * s.powf(-w[9])
            * (f64::exp((1.0 - r) * w[10]) - 1.0)
            * hard_penalty
            * easy_bonus;
        self.clamp_stability(s * (1.0 + growth))
    }

    /// Stability after a lapse.
    pub fn next_stability_on_lapse(
        &self,
        d: Difficulty,
        s: Stability,
        r: Retrievability,
    ) -> Stability {
        let w = &self.w;
        let long_term = w[11]
            * d.powf(-w[12])
            * ((s + 1.0).powf(w[13]) - 1.0)
            * f64::exp((1.0 - r) * w[14]);
        let short_term = s / f64::exp(w[17] * w[18]);
        self.clamp_stability(long_term.min(short_term))
    }

    pub fn next_stability(
        &self,
        d: Difficulty,
        s: Stability,
        r: Retrievability,
        rating: Rating,
    ) -> Stability {
        match rating {
            Rating::Again => self.next_stability_on_lapse(d, s, r),
            Rating::Hard | Rating::Good | Rating::Easy => {
                self.next_stability_on_success(d, s, r, rating)
            }
        }
    }

    /// Stability after a review less than a day after the previous one.
    pub fn short_term_stability(&self, s: Stability, rating: Rating) -> Stability {
        let w = &self.w;
        let mut increase = f64::exp(w[17] * (rating.value() - 3.0 + w[18])) * s.powf(-w[19]);
        if rating >= Rating::Good {
            increase = increase.max(1.0);
        }
        self.clamp_stability(s * increase)
    }

    fn clamp_difficulty(&self, d: Difficulty) -> Difficulty {
        d.clamp(self.min_difficulty, self.max_difficulty)
    }

    fn clamp_stability(&self, s: Stability) -> Stability {
        s.max(self.min_stability)
    }
}
