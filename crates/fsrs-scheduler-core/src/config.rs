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

//! Scheduler configuration.
//!
//! Every tunable of the memory model and the review policy lives here. The
//! defaults are the published FSRS-6 parameters with the usual learning
//! steps. A configuration is usually loaded from a TOML file in which every
//! key is optional:
//!
//! ```toml
//! desired_retention = 0.85
//! learning_steps = [1, 10]
//! relearning_steps = [10]
//! maximum_interval = 365
//!
//! [fuzz]
//! enabled = false
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::invalid;
use crate::fsrs::PARAMETER_COUNT;
use crate::fsrs::Parameters;
use crate::types::rating::Rating;

/// Upper bound on `maximum_interval`, in days.
pub const MAX_INTERVAL: u32 = 36500;

/// The FSRS-6 default weights.
pub const DEFAULT_PARAMETERS: Parameters = [
    0.212, 1.2931, 2.3065, 8.2956, 6.4133, 0.8334, 3.0194, 0.001, 1.8722, 0.1666, 0.796, 1.4835,
    0.0614, 0.2629, 1.6483, 0.6014, 1.8729, 0.5425, 0.0912, 0.0658, 0.1542,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Model weights. The last one is the decay exponent of the forgetting
    /// curve.
    pub parameters: Parameters,
    /// The probability of recall the scheduler aims for at the due date.
    pub desired_retention: f64,
    /// Learning step intervals, in minutes.
    pub learning_steps: Vec<u32>,
    /// Relearning step intervals, in minutes.
    pub relearning_steps: Vec<u32>,
    /// Bounds on review intervals, in days.
    pub minimum_interval: u32,
    pub maximum_interval: u32,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub min_stability: f64,
    pub review_multipliers: ReviewMultipliers,
    pub fuzz: FuzzConfig,
}

/// Scales the stability-based interval of a card that stays in review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewMultipliers {
    pub hard: f64,
    pub good: f64,
    pub easy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuzzConfig {
    pub enabled: bool,
    pub ranges: Vec<FuzzRange>,
}

/// Intervals between `start` and `end` days contribute `factor` days of
/// fuzz per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuzzRange {
    pub start: f64,
    /// Open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    pub factor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parameters: DEFAULT_PARAMETERS,
            desired_retention: 0.9,
            learning_steps: vec![1, 10],
            relearning_steps: vec![10],
            minimum_interval: 1,
            maximum_interval: MAX_INTERVAL,
            min_difficulty: 1.0,
            max_difficulty: 10.0,
            min_stability: 0.001,
            review_multipliers: ReviewMultipliers::default(),
            fuzz: FuzzConfig::default(),
        }
    }
}

impl Default for ReviewMultipliers {
    fn default() -> Self {
        Self {
            hard: 1.0,
            good: 1.0,
            easy: 1.0,
        }
    }
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ranges: vec![
                FuzzRange {
                    start: 2.5,
                    end: Some(7.0),
                    factor: 0.15,
                },
                FuzzRange {
                    start: 7.0,
                    end: Some(20.0),
                    factor: 0.1,
                },
                FuzzRange {
                    start: 20.0,
                    end: None,
                    factor: 0.05,
                },
            ],
        }
    }
}

impl ReviewMultipliers {
    pub fn get(&self, rating: Rating) -> f64 {
        match rating {
            Rating::Again => 1.0,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }
}

impl SchedulerConfig {
    pub fn from_toml_str(s: &str) -> Fallible<Self> {
        let config: SchedulerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Fallible<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The same configuration with fuzzing turned off.
    pub fn without_fuzz(mut self) -> Self {
        self.fuzz.enabled = false;
        self
    }

    pub fn validate(&self) -> Fallible<()> {
        if let Some((i, w)) = self
            .parameters
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite())
        {
            return invalid(format!("parameter w[{i}] must be finite, got {w}"));
        }
        let decay = self.parameters[PARAMETER_COUNT - 1];
        if decay <= 0.0 {
            return invalid(format!(
                "parameter w[{}] (decay) must be positive, got {decay}",
                PARAMETER_COUNT - 1
            ));
        }
        if !(self.desired_retention > 0.0 && self.desired_retention < 1.0) {
            return invalid(format!(
                "desired_retention must be strictly between 0 and 1, got {}",
                self.desired_retention
            ));
        }
        if self.learning_steps.contains(&0) || self.relearning_steps.contains(&0) {
            return invalid("learning and relearning steps must be at least one minute");
        }
        if self.minimum_interval < 1 {
            return invalid("minimum_interval must be at least one day");
        }
        if self.maximum_interval > MAX_INTERVAL {
            return invalid(format!(
                "maximum_interval must be at most {MAX_INTERVAL} days, got {}",
                self.maximum_interval
            ));
        }
        if self.maximum_interval < self.minimum_interval {
            return invalid(format!(
                "maximum_interval ({}) is less than minimum_interval ({})",
                self.maximum_interval, self.minimum_interval
            ));
        }
        if !(self.min_difficulty.is_finite()
            && self.max_difficulty.is_finite()
            && self.min_difficulty < self.max_difficulty)
        {
            return invalid(format!(
                "difficulty bounds are inconsistent: [{}, {}]",
                self.min_difficulty, self.max_difficulty
            ));
        }
        if !(self.min_stability.is_finite() && self.min_stability > 0.0) {
            return invalid(format!(
                "min_stability must be positive, got {}",
                self.min_stability
            ));
        }
        let m = &self.review_multipliers;
        for (name, value) in [("hard", m.hard), ("good", m.good), ("easy", m.easy)] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!(
                    "review multiplier {name} must be positive, got {value}"
                ));
            }
        }
        for range in &self.fuzz.ranges {
            let end_ok = range.end.is_none_or(|end| end >= range.start);
            if !(range.start.is_finite() && range.factor >= 0.0 && end_ok) {
                return invalid(format!("invalid fuzz range: {range:?}"));
            }
        }
        Ok(())
    }
}
