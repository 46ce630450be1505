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

//! Interval fuzzing, so that cards reviewed together drift apart.

use rand::Rng;

use crate::config::FuzzRange;

/// Intervals shorter than this are never fuzzed.
const MIN_FUZZABLE_DAYS: f64 = 2.5;

/// A fuzzed interval is never shorter than this.
const MIN_FUZZED_DAYS: u32 = 2;

/// How many days either side of `days` a fuzzed interval may land.
pub fn fuzz_delta(days: u32, ranges: &[FuzzRange]) -> f64 {
    let days = days as f64;
    let mut delta = 1.0;
    for range in ranges {
        let end = range.end.unwrap_or(f64::INFINITY);
        delta += range.factor * (days.min(end) - range.start).max(0.0);
    }
    delta
}

/// The inclusive range a fuzzed interval is drawn from, or `None` if the
/// interval is too short to fuzz.
pub fn fuzz_bounds(days: u32, ranges: &[FuzzRange], maximum_interval: u32) -> Option<(u32, u32)> {
    if (days as f64) < MIN_FUZZABLE_DAYS {
        return None;
    }
    let delta = fuzz_delta(days, ranges);
    let lo = ((days as f64 - delta).round() as u32).max(MIN_FUZZED_DAYS);
    let hi = ((days as f64 + delta).round() as u32).min(maximum_interval);
    Some((lo.min(hi), hi))
}

pub fn fuzz_interval<G: Rng + ?Sized>(
    days: u32,
    ranges: &[FuzzRange],
    maximum_interval: u32,
    rng: &mut G,
) -> u32 {
    match fuzz_bounds(days, ranges, maximum_interval) {
        Some((lo, hi)) => rng.gen_range(lo..=hi),
        None => days,
    }
}
