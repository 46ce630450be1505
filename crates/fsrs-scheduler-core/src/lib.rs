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

//! fsrs-scheduler-core: the review engine behind fsrs-scheduler.
//!
//! Given a card's memory state, a rating, and the time of review, compute the
//! card's new difficulty, stability, state, and due date:
//! - `fsrs`: the FSRS-6 memory model
//! - `machine`: the learning / review / relearning state machine
//! - `scheduler`: the `review` entry point, validation, and fuzzing
//!
//! The engine keeps no state between calls and performs no I/O.

pub mod config;
pub mod error;
pub mod fsrs;
pub mod fuzz;
pub mod machine;
pub mod scheduler;
pub mod types;

// Re-exports for convenience
pub use config::SchedulerConfig;
pub use error::{ErrorKind, ErrorReport, Fallible, fail, invalid};
pub use scheduler::Scheduler;
pub use types::card::Card;
pub use types::rating::Rating;
pub use types::review_log::ReviewLog;
pub use types::state::State;
pub use types::timestamp::Timestamp;
