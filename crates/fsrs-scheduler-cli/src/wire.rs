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

//! The JSON shape of review requests and responses.

use fsrs_scheduler_core::Card;
use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::Rating;
use fsrs_scheduler_core::ReviewLog;
use fsrs_scheduler_core::Scheduler;
use fsrs_scheduler_core::State;
use fsrs_scheduler_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub card: CardPayload,
    /// 1 = Again, 2 = Hard, 3 = Good, 4 = Easy. Kept raw so that an out of
    /// range value is reported as invalid input rather than a parse error.
    pub rating: i64,
    /// Defaults to the time the request is handled.
    #[serde(default)]
    pub review_time: Option<String>,
    /// Seeds the interval fuzz.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A card as sent by clients. Every field is optional; a payload of `{}` is
/// a new card.
#[derive(Debug, Default, Deserialize)]
pub struct CardPayload {
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub stability: Option<f64>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_review: Option<String>,
    #[serde(default)]
    pub step: Option<usize>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub lapses: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub card: Card,
    pub review_log: ReviewLog,
}

impl CardPayload {
    pub fn into_card(self, now: Timestamp) -> Fallible<Card> {
        let state = match self.state {
            Some(state) => state.parse::<State>()?,
            None => State::Learning,
        };
        let last_review = match self.last_review {
            Some(last_review) => Some(Timestamp::parse(&last_review)?),
            None => None,
        };
        let due = match (self.due, last_review) {
            (Some(due), _) => Timestamp::parse(&due)?,
            (None, Some(last_review)) => now.max(last_review),
            (None, None) => now,
        };
        let step = match state {
            State::Learning | State::Relearning => Some(self.step.unwrap_or(0)),
            State::Review => None,
        };
        Ok(Card {
            difficulty: self.difficulty,
            stability: self.stability,
            due,
            state,
            step,
            last_review,
            reps: self.reps.unwrap_or(0),
            lapses: self.lapses.unwrap_or(0),
        })
    }
}

pub fn parse_request(body: &str) -> Fallible<ReviewRequest> {
    Ok(serde_json::from_str(body)?)
}

/// Run one review request through the scheduler. `now` stands in for any
/// missing timestamp.
pub fn process(
    scheduler: &Scheduler,
    request: ReviewRequest,
    now: Timestamp,
) -> Fallible<ReviewResponse> {
    let rating = Rating::try_from(request.rating)?;
    let review_time = match request.review_time {
        Some(review_time) => Timestamp::parse(&review_time)?,
        None => now,
    };
    let card = request.card.into_card(now)?;
    let (card, review_log) = match request.seed {
        Some(seed) => scheduler.review_seeded(&card, rating, review_time, seed)?,
        None => scheduler.review(&card, rating, review_time)?,
    };
    Ok(ReviewResponse { card, review_log })
}

#[cfg(test)]
mod tests {
    use fsrs_scheduler_core::ErrorKind;
    use fsrs_scheduler_core::SchedulerConfig;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::parse("2025-01-18T14:00:00Z").unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(SchedulerConfig::default().without_fuzz()).unwrap()
    }

    #[test]
    fn test_empty_card_is_new() -> Fallible<()> {
        let card = CardPayload::default().into_card(now())?;
        assert_eq!(card, Card::new(now()));
        Ok(())
    }

    #[test]
    fn test_unknown_state() {
        let payload = CardPayload {
            state: Some("NEW".to_string()),
            ..CardPayload::default()
        };
        let err = payload.into_card(now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_bad_timestamp() {
        let payload = CardPayload {
            due: Some("tomorrow".to_string()),
            ..CardPayload::default()
        };
        assert!(payload.into_card(now()).is_err());
    }

    #[test]
    fn test_review_step_is_dropped() -> Fallible<()> {
        let payload = CardPayload {
            difficulty: Some(5.0),
            stability: Some(10.0),
            state: Some("REVIEW".to_string()),
            last_review: Some("2025-01-15T10:30:00".to_string()),
            step: Some(3),
            ..CardPayload::default()
        };
        let card = payload.into_card(now())?;
        assert_eq!(card.step, None);
        assert_eq!(
            card.last_review.map(|t| t.to_rfc3339()),
            Some("2025-01-15T10:30:00Z".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_missing_due_follows_last_review() -> Fallible<()> {
        let payload = CardPayload {
            difficulty: Some(5.0),
            stability: Some(10.0),
            state: Some("REVIEW".to_string()),
            last_review: Some("2025-01-20T10:30:00Z".to_string()),
            ..CardPayload::default()
        };
        let card = payload.into_card(now())?;
        assert_eq!(card.due, Timestamp::parse("2025-01-20T10:30:00Z")?);
        Ok(())
    }

    #[test]
    fn test_due_before_last_review() -> Fallible<()> {
        let request = parse_request(
            r#"{
                "card": {
                    "difficulty": 5.0,
                    "stability": 10.0,
                    "due": "2025-01-10T10:30:00Z",
                    "state": "REVIEW",
                    "last_review": "2025-01-15T10:30:00Z"
                },
                "rating": 3
            }"#,
        )?;
        let err = process(&scheduler(), request, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn test_process() -> Fallible<()> {
        let request = parse_request(
            r#"{
                "card": {
                    "difficulty": 5.0,
                    "stability": 10.0,
                    "due": "2025-01-18T10:30:00Z",
                    "state": "REVIEW",
                    "last_review": "2025-01-15T10:30:00Z",
                    "reps": 3
                },
                "rating": 3,
                "review_time": "2025-01-18T14:00:00Z"
            }"#,
        )?;
        let response = process(&scheduler(), request, now())?;
        assert_eq!(response.card.state, State::Review);
        assert!(response.card.stability.unwrap() > 10.0);
        assert_eq!(response.card.reps, 4);
        assert_eq!(response.review_log.rating, Rating::Good);

        let json = serde_json::to_value(&response)?;
        assert_eq!(json["state"], "REVIEW");
        assert_eq!(json["last_review"], "2025-01-18T14:00:00Z");
        assert!(json["due"].as_str().unwrap().ends_with('Z'));
        assert!(json["review_log"].is_object());
        Ok(())
    }

    #[test]
    fn test_process_bad_rating() -> Fallible<()> {
        let request = parse_request(r#"{"card": {}, "rating": 5}"#)?;
        let err = process(&scheduler(), request, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn test_missing_review_time_is_now() -> Fallible<()> {
        let request = parse_request(r#"{"card": {}, "rating": 1}"#)?;
        let response = process(&scheduler(), request, now())?;
        assert_eq!(response.card.last_review, Some(now()));
        assert_eq!(response.review_log.reviewed_at, now());
        Ok(())
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_request("{\"card\": ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
