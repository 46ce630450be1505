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

use chrono::Duration;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SchedulerConfig;
use crate::error::Fallible;
use crate::fsrs::MemoryModel;
use crate::fsrs::Retrievability;
use crate::fsrs::Stability;
use crate::fuzz::fuzz_interval;
use crate::machine::NextInterval;
use crate::machine::Steps;
use crate::types::card::Card;
use crate::types::rating::Rating;
use crate::types::review_log::ReviewLog;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// Reviews cards. Holds only immutable configuration, so one instance can be
/// shared freely between threads.
#[derive(Clone, Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    model: MemoryModel,
    steps: Steps,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Fallible<Self> {
        config.validate()?;
        let model = MemoryModel::new(&config);
        let steps = Steps::from_minutes(&config.learning_steps, &config.relearning_steps);
        Ok(Self {
            config,
            model,
            steps,
        })
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    /// Review `card` with `rating` at `review_time`. Fuzz, when enabled,
    /// draws from the thread-local RNG.
    pub fn review(
        &self,
        card: &Card,
        rating: Rating,
        review_time: Timestamp,
    ) -> Fallible<(Card, ReviewLog)> {
        self.review_with_rng(card, rating, review_time, &mut rand::thread_rng())
    }

    /// Like [`Scheduler::review`], with fuzz drawn from an RNG seeded with
    /// `seed`. The same inputs and seed always give the same result.
    pub fn review_seeded(
        &self,
        card: &Card,
        rating: Rating,
        review_time: Timestamp,
        seed: u64,
    ) -> Fallible<(Card, ReviewLog)> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.review_with_rng(card, rating, review_time, &mut rng)
    }

    pub fn review_with_rng<G: RngCore>(
        &self,
        card: &Card,
        rating: Rating,
        review_time: Timestamp,
        rng: &mut G,
    ) -> Fallible<(Card, ReviewLog)> {
        let fuzz: Option<&mut dyn RngCore> = if self.config.fuzz.enabled {
            Some(rng as &mut dyn RngCore)
        } else {
            None
        };
        self.apply(card, rating, review_time, fuzz)
    }

    /// The outcome of each rating, without fuzz.
    pub fn preview(&self, card: &Card, now: Timestamp) -> Fallible<Vec<(Rating, Card)>> {
        Rating::ALL
            .iter()
            .map(|rating| -> Fallible<(Rating, Card)> {
                let (card, _) = self.apply(card, *rating, now, None)?;
                Ok((*rating, card))
            })
            .collect()
    }

    /// The probability that the card is recalled at `now`. Zero for a card
    /// that has never been reviewed.
    pub fn retrievability(&self, card: &Card, now: Timestamp) -> Retrievability {
        match (card.memory(), card.last_review) {
            (Some(memory), Some(last_review)) => {
                let elapsed = now.days_since(last_review).max(0.0);
                self.model.retrievability(elapsed, memory.stability)
            }
            _ => 0.0,
        }
    }

    fn apply(
        &self,
        card: &Card,
        rating: Rating,
        review_time: Timestamp,
        fuzz: Option<&mut dyn RngCore>,
    ) -> Fallible<(Card, ReviewLog)> {
        card.validate(&self.config)?;

        let elapsed_days: Option<f64> = card.last_review.map(|last_review| {
            let days = review_time.days_since(last_review);
            if days < 0.0 {
                log::warn!(
                    "Review time {review_time} precedes last review {last_review}; treating elapsed time as zero."
                );
            }
            days.max(0.0)
        });

        // Difficulty is always settled before stability.
        let (difficulty, stability, retrievability) = match (card.memory(), elapsed_days) {
            (Some(memory), Some(elapsed)) => {
                let r = self.model.retrievability(elapsed, memory.stability);
                let difficulty = self.model.next_difficulty(memory.difficulty, rating);
                let stability = if elapsed < 1.0 {
                    self.model.short_term_stability(memory.stability, rating)
                } else {
                    self.model
                        .next_stability(memory.difficulty, memory.stability, r, rating)
                };
                (difficulty, stability, Some(r))
            }
            _ => {
                let difficulty = self.model.initial_difficulty(rating);
                let stability = self.model.initial_stability(rating);
                (difficulty, stability, None)
            }
        };

        let transition = self.steps.transition(card.state, card.step, rating);
        let interval: Duration = match transition.interval {
            NextInterval::Step(duration) => duration,
            NextInterval::Scheduled => {
                let multiplier = if card.state == State::Review {
                    self.config.review_multipliers.get(rating)
                } else {
                    1.0
                };
                let mut days = self.scheduled_days(stability, multiplier);
                if let Some(rng) = fuzz {
                    days = fuzz_interval(
                        days,
                        &self.config.fuzz.ranges,
                        self.config.maximum_interval,
                        rng,
                    )
                    .clamp(self.config.minimum_interval, self.config.maximum_interval);
                }
                Duration::days(days as i64)
            }
        };

        let due = review_time.plus(interval)?;
        let lapses = if transition.lapse {
            card.lapses.saturating_add(1)
        } else {
            card.lapses
        };
        let new_card = Card {
            difficulty: Some(difficulty),
            stability: Some(stability),
            due,
            state: transition.state,
            step: transition.step,
            last_review: Some(review_time),
            reps: card.reps.saturating_add(1),
            lapses,
        };

        let diff_percent = ((difficulty - self.config.min_difficulty)
            / (self.config.max_difficulty - self.config.min_difficulty))
            * 100.0;
        log::debug!(
            "{} {} -> {} S={:.2}d D={:.2}% due={}",
            rating,
            card.state,
            new_card.state,
            stability,
            diff_percent,
            due
        );

        let review_log = ReviewLog {
            rating,
            state_before: card.state,
            state_after: new_card.state,
            elapsed_days,
            retrievability,
            reviewed_at: review_time,
            scheduled_days: due.days_since(review_time),
        };
        Ok((new_card, review_log))
    }

    /// The stability-based interval in whole days, before fuzz.
    fn scheduled_days(&self, stability: Stability, multiplier: f64) -> u32 {
        let days = self.model.interval(self.config.desired_retention, stability) * multiplier;
        let min = self.config.minimum_interval as f64;
        let max = self.config.maximum_interval as f64;
        days.round().clamp(min, max) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(SchedulerConfig::default().without_fuzz()).unwrap()
    }

    fn review_card() -> Card {
        Card {
            difficulty: Some(5.0),
            stability: Some(10.0),
            due: ts("2025-01-18T10:30:00Z"),
            state: State::Review,
            step: None,
            last_review: Some(ts("2025-01-15T10:30:00Z")),
            reps: 3,
            lapses: 0,
        }
    }

    #[test]
    fn test_new_card_good() -> Fallible<()> {
        let s = scheduler();
        let now = ts("2025-01-18T14:00:00Z");
        let (card, log) = s.review(&Card::new(now), Rating::Good, now)?;
        assert_eq!(card.state, State::Learning);
        assert_eq!(card.step, Some(1));
        assert_eq!(card.difficulty, Some(s.model().initial_difficulty(Rating::Good)));
        assert_eq!(card.stability, Some(s.model().initial_stability(Rating::Good)));
        assert_eq!(card.due, now.plus(Duration::minutes(10))?);
        assert!(card.due > now);
        assert_eq!(card.last_review, Some(now));
        assert_eq!(card.reps, 1);
        assert_eq!(log.state_before, State::Learning);
        assert_eq!(log.elapsed_days, None);
        assert_eq!(log.retrievability, None);
        Ok(())
    }

    #[test]
    fn test_new_card_easy_graduates() -> Fallible<()> {
        let s = scheduler();
        let now = ts("2025-01-18T14:00:00Z");
        let (card, _) = s.review(&Card::new(now), Rating::Easy, now)?;
        assert_eq!(card.state, State::Review);
        assert_eq!(card.step, None);
        // round(8.2956)
        assert_eq!(card.due, now.plus(Duration::days(8))?);
        Ok(())
    }

    #[test]
    fn test_learning_through_to_review() -> Fallible<()> {
        let s = scheduler();
        let t0 = ts("2025-01-18T14:00:00Z");
        let (card, _) = s.review(&Card::new(t0), Rating::Good, t0)?;
        let t1 = card.due;
        let (card, log) = s.review(&card, Rating::Good, t1)?;
        assert_eq!(card.state, State::Review);
        assert_eq!(log.state_before, State::Learning);
        assert_eq!(log.state_after, State::Review);
        assert!(card.due >= t1.plus(Duration::days(1))?);
        assert_eq!(card.reps, 2);
        Ok(())
    }

    #[test]
    fn test_review_good() -> Fallible<()> {
        let s = scheduler();
        let card = review_card();
        let now = ts("2025-01-18T14:00:00Z");
        let (next, log) = s.review(&card, Rating::Good, now)?;
        let elapsed = log.elapsed_days.unwrap();
        assert!((elapsed - 3.15).abs() < 0.01);
        assert!(next.stability.unwrap() > 10.0);
        assert_eq!(next.state, State::Review);
        assert!(next.due > now);
        assert!(log.retrievability.unwrap() < 1.0);
        assert_eq!(next.lapses, 0);
        Ok(())
    }

    #[test]
    fn test_review_again() -> Fallible<()> {
        let s = scheduler();
        let card = review_card();
        let now = ts("2025-01-18T14:00:00Z");
        let (next, log) = s.review(&card, Rating::Again, now)?;
        assert_eq!(next.state, State::Relearning);
        assert_eq!(next.step, Some(0));
        assert!(next.stability.unwrap() < 10.0);
        assert!(next.due > now);
        assert!(next.due <= now.plus(Duration::minutes(10))?);
        assert_eq!(next.lapses, 1);
        assert_eq!(log.state_after, State::Relearning);
        Ok(())
    }

    #[test]
    fn test_input_card_is_not_modified() -> Fallible<()> {
        let s = scheduler();
        let card = review_card();
        let before = card.clone();
        let _ = s.review(&card, Rating::Again, ts("2025-01-18T14:00:00Z"))?;
        assert_eq!(card, before);
        Ok(())
    }

    #[test]
    fn test_review_before_last_review() -> Fallible<()> {
        let s = scheduler();
        let card = review_card();
        let now = ts("2025-01-14T09:00:00Z");
        let (next, log) = s.review(&card, Rating::Good, now)?;
        assert_eq!(log.elapsed_days, Some(0.0));
        assert_eq!(log.retrievability, Some(1.0));
        assert_eq!(next.last_review, Some(now));
        assert!(next.due > now);
        Ok(())
    }

    #[test]
    fn test_invalid_card() {
        let s = scheduler();
        let mut card = review_card();
        card.difficulty = Some(0.0);
        let err = s
            .review(&card, Rating::Good, ts("2025-01-18T14:00:00Z"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_lapse_monotonicity() -> Fallible<()> {
        let s = scheduler();
        let last_review = ts("2025-01-01T00:00:00Z");
        for stability in [0.01, 0.5, 3.0, 10.0, 100.0, 1000.0] {
            for difficulty in [1.0, 5.0, 10.0] {
                for hours in [0, 12, 24, 120, 720, 9600] {
                    let card = Card {
                        difficulty: Some(difficulty),
                        stability: Some(stability),
                        due: last_review,
                        state: State::Review,
                        step: None,
                        last_review: Some(last_review),
                        reps: 1,
                        lapses: 0,
                    };
                    let now = last_review.plus(Duration::hours(hours))?;
                    let (next, _) = s.review(&card, Rating::Again, now)?;
                    assert_eq!(next.state, State::Relearning);
                    assert_eq!(next.step, Some(0));
                    assert!(next.stability.unwrap() <= stability);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_determinism_without_fuzz() -> Fallible<()> {
        let s = scheduler();
        let card = review_card();
        let now = ts("2025-01-28T14:00:00Z");
        for rating in Rating::ALL {
            let a = s.review(&card, rating, now)?;
            let b = s.review(&card, rating, now)?;
            assert_eq!(a, b);
        }
        Ok(())
    }

    #[test]
    fn test_determinism_with_seed() -> Fallible<()> {
        let s = Scheduler::new(SchedulerConfig::default())?;
        let mut card = review_card();
        card.stability = Some(60.0);
        let now = ts("2025-03-01T14:00:00Z");
        let a = s.review_seeded(&card, Rating::Good, now, 99)?;
        let b = s.review_seeded(&card, Rating::Good, now, 99)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_fuzz_stays_near_unfuzzed_interval() -> Fallible<()> {
        let fuzzed = Scheduler::new(SchedulerConfig::default())?;
        let plain = scheduler();
        let mut card = review_card();
        card.stability = Some(60.0);
        let now = ts("2025-03-01T14:00:00Z");
        let (expected, _) = plain.review(&card, Rating::Good, now)?;
        let expected_days = expected.due.days_since(now);
        for seed in 0..50 {
            let (next, _) = fuzzed.review_seeded(&card, Rating::Good, now, seed)?;
            let days = next.due.days_since(now);
            assert!((days - expected_days).abs() <= expected_days * 0.1 + 1.0);
            assert!(days >= 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_review_multipliers() -> Fallible<()> {
        let mut config = SchedulerConfig::default().without_fuzz();
        config.review_multipliers.hard = 0.5;
        config.review_multipliers.easy = 2.0;
        let scaled = Scheduler::new(config)?;
        let plain = scheduler();
        let card = review_card();
        let now = ts("2025-01-25T10:30:00Z");
        let days = |s: &Scheduler, rating: Rating| -> Fallible<f64> {
            let (next, log) = s.review(&card, rating, now)?;
            assert_eq!(next.due.days_since(now), log.scheduled_days);
            Ok(log.scheduled_days)
        };
        assert!(days(&scaled, Rating::Hard)? < days(&plain, Rating::Hard)?);
        assert!(days(&scaled, Rating::Easy)? > days(&plain, Rating::Easy)?);
        assert_eq!(days(&scaled, Rating::Good)?, days(&plain, Rating::Good)?);
        assert!(days(&plain, Rating::Hard)? <= days(&plain, Rating::Good)?);
        assert!(days(&plain, Rating::Good)? <= days(&plain, Rating::Easy)?);
        Ok(())
    }

    #[test]
    fn test_interval_bounds() -> Fallible<()> {
        let mut config = SchedulerConfig::default().without_fuzz();
        config.minimum_interval = 3;
        config.maximum_interval = 5;
        let s = Scheduler::new(config)?;
        let now = ts("2025-01-25T10:30:00Z");

        let mut card = review_card();
        card.stability = Some(500.0);
        let (next, _) = s.review(&card, Rating::Easy, now)?;
        assert_eq!(next.due, now.plus(Duration::days(5))?);

        let mut card = review_card();
        card.stability = Some(0.1);
        card.difficulty = Some(10.0);
        let (next, _) = s.review(&card, Rating::Hard, now)?;
        assert_eq!(next.due, now.plus(Duration::days(3))?);
        Ok(())
    }

    #[test]
    fn test_relearning_good_returns_to_review() -> Fallible<()> {
        let s = scheduler();
        let now = ts("2025-01-18T14:00:00Z");
        let (lapsed, _) = s.review(&review_card(), Rating::Again, now)?;
        let (next, log) = s.review(&lapsed, Rating::Good, lapsed.due)?;
        assert_eq!(log.state_before, State::Relearning);
        assert_eq!(next.state, State::Review);
        assert_eq!(next.step, None);
        assert_eq!(next.lapses, 1);
        Ok(())
    }

    #[test]
    fn test_preview() -> Fallible<()> {
        let s = scheduler();
        let now = ts("2025-01-18T14:00:00Z");
        let preview = s.preview(&review_card(), now)?;
        let ratings: Vec<Rating> = preview.iter().map(|(rating, _)| *rating).collect();
        assert_eq!(ratings, Rating::ALL.to_vec());
        assert_eq!(preview[0].1.state, State::Relearning);
        assert!(preview[1].1.due <= preview[2].1.due);
        assert!(preview[2].1.due <= preview[3].1.due);
        Ok(())
    }

    #[test]
    fn test_retrievability() {
        let s = scheduler();
        let card = review_card();
        assert_eq!(s.retrievability(&Card::new(ts("2025-01-01T00:00:00Z")), card.due), 0.0);
        assert_eq!(s.retrievability(&card, ts("2025-01-15T10:30:00Z")), 1.0);
        let r = s.retrievability(&card, ts("2025-01-25T10:30:00Z"));
        assert!((r - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_counters_saturate() -> Fallible<()> {
        let s = scheduler();
        let mut card = review_card();
        card.reps = u32::MAX;
        card.lapses = u32::MAX;
        let (next, _) = s.review(&card, Rating::Again, ts("2025-01-25T10:30:00Z"))?;
        assert_eq!(next.reps, u32::MAX);
        assert_eq!(next.lapses, u32::MAX);
        Ok(())
    }

    #[test]
    fn test_due_past_year_9999_is_rejected() -> Fallible<()> {
        let s = scheduler();
        let mut card = review_card();
        card.stability = Some(30000.0);
        card.due = ts("9999-01-18T14:00:00Z");
        card.last_review = Some(ts("9999-01-01T14:00:00Z"));
        let err = s
            .review(&card, Rating::Good, ts("9999-01-18T14:00:00Z"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // A due date that stays within range can be sent back in.
        let (next, _) = s.review(&card, Rating::Again, ts("9999-01-18T14:00:00Z"))?;
        let json = serde_json::to_string(&next)?;
        let parsed: Card = serde_json::from_str(&json)?;
        assert_eq!(parsed.due, next.due);
        assert_eq!(parsed.last_review, next.last_review);
        assert_eq!(parsed.state, State::Relearning);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let mut config = SchedulerConfig::default();
        config.desired_retention = 1.5;
        let err = Scheduler::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
